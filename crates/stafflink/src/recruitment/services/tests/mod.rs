mod applicants;
mod common;
mod exports;
mod verification;
