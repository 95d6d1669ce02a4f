// Provider test module
#[cfg(test)]
mod provider_tests;
