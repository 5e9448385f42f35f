//! romance-copy: 商品ワークブックからPDPコピーを生成し、禁止語・文数をチェックする

pub mod ai_provider;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod rules;
pub mod sanity;
pub mod sheet_selector;
pub mod workbook;
