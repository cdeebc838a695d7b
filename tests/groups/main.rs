mod lib;

mod parallel;
mod rendering;
mod things;
