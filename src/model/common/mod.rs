mod office;

pub use office::Office;
