pub use rest::RestBackend;

mod rest;

#[cfg(test)]
mod tests;
