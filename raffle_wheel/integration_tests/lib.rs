#[cfg(test)]
mod raffle_session;
