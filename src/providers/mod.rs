pub mod command_signer;
pub mod pump_fun;
pub mod solana_rpc;
pub mod solmosaic_api;
pub mod util;
