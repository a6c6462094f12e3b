use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 預設顯示欄位
pub const DEFAULT_DISPLAY_FIELDS: [&str; 10] = [
    "lastPrice",
    "change",
    "pChange",
    "open",
    "dayHigh",
    "dayLow",
    "closePrice",
    "previousClose",
    "high52",
    "low52",
];

/// Every field name the NSE quote payload may carry.
pub const ALL_DISPLAY_FIELDS: [&str; 66] = [
    "adhocMargin",
    "applicableMargin",
    "averagePrice",
    "bcEndDate",
    "bcStartDate",
    "buyPrice1",
    "buyPrice2",
    "buyPrice3",
    "buyPrice4",
    "buyPrice5",
    "buyQuantity1",
    "buyQuantity2",
    "buyQuantity3",
    "buyQuantity4",
    "buyQuantity5",
    "change",
    "closePrice",
    "cm_adj_high",
    "cm_adj_high_dt",
    "cm_adj_low",
    "cm_adj_low_dt",
    "cm_ffm",
    "companyName",
    "dayHigh",
    "dayLow",
    "deliveryQuantity",
    "deliveryToTradedQuantity",
    "exDate",
    "extremeLossMargin",
    "faceValue",
    "high52",
    "indexVar",
    "isinCode",
    "lastPrice",
    "low52",
    "marketType",
    "ndEndDate",
    "ndStartDate",
    "open",
    "pChange",
    "previousClose",
    "priceBand",
    "pricebandlower",
    "pricebandupper",
    "purpose",
    "quantityTraded",
    "recordDate",
    "secDate",
    "securityVar",
    "sellPrice1",
    "sellPrice2",
    "sellPrice3",
    "sellPrice4",
    "sellPrice5",
    "sellQuantity1",
    "sellQuantity2",
    "sellQuantity3",
    "sellQuantity4",
    "sellQuantity5",
    "series",
    "symbol",
    "totalBuyQuantity",
    "totalSellQuantity",
    "totalTradedValue",
    "totalTradedVolume",
    "varMargin",
];

/// The three persisted display settings.
///
/// The string form is both the public setting name and the `config.setting` key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, AsRefStr, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DisplaySetting {
    /// 使用者目前的顯示欄位
    CurrentFields,
    /// 初始化後不再變動的預設欄位
    DefaultFields,
    /// 報價可能出現的所有欄位
    AllFields,
}

impl DisplaySetting {
    /// Value written at bootstrap.
    pub fn seed(&self) -> &'static [&'static str] {
        match self {
            DisplaySetting::CurrentFields | DisplaySetting::DefaultFields => {
                &DEFAULT_DISPLAY_FIELDS
            }
            DisplaySetting::AllFields => &ALL_DISPLAY_FIELDS,
        }
    }
}

/// One quote snapshot: the `data[0]` object of the quote page, keys untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct Quote {
    fields: Map<String, Value>,
}

impl Quote {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field value as shown on the terminal: strings unquoted, other JSON as-is.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// 股票代號與公司名稱
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Security {
    pub code: String,
    pub name: String,
}

impl Security {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Security {
            code: code.into(),
            name: name.into(),
        }
    }
}
