#[cfg(test)]
mod replay_tests;
