/// 使用者顯示設定 `config`
pub mod config;
/// 股票代號與公司名稱 `stocks`
pub mod stock;
