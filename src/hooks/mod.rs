mod use_roulette;
mod use_wallet;

pub use use_roulette::use_roulette;
pub use use_wallet::{use_wallet, WalletAction};
