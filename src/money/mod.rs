// 💱 Money Collaborator - currency catalog + immutable money value
//
// The mapping engine only needs three things from money:
// - construct from (currency code, amount string)
// - read the amount back as an exact string
// - read the currency ISO code
//
// Arithmetic, comparison and rounding are not part of this module.

pub mod currency;
pub mod value;

pub use currency::{Currency, CurrencyRegistry};
pub use value::{Money, MoneyError};
