// src/blockchain/services/mod.rs

pub mod blocks;
pub mod network;
pub mod transactions;
pub mod transfer_value;
