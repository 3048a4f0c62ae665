//! Account classes, budget categories and sign conventions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Report class of a chart code, decided by its first segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountClass {
    /// 1 - ASET
    Assets,
    /// 2 - KEWAJIBAN
    Liabilities,
    /// 3 - EKUITAS
    Equity,
    /// 4 - PENDAPATAN DAERAH
    Revenue,
    /// 5 - BELANJA DAERAH
    Expenditure,
    /// 6 - PEMBIAYAAN DAERAH
    Financing,
    /// 7 - PENDAPATAN DAERAH-LO
    OperationalRevenue,
    /// 8 - BEBAN DAERAH
    Expenses,
}

impl AccountClass {
    pub const ALL: [AccountClass; 8] = [
        AccountClass::Assets,
        AccountClass::Liabilities,
        AccountClass::Equity,
        AccountClass::Revenue,
        AccountClass::Expenditure,
        AccountClass::Financing,
        AccountClass::OperationalRevenue,
        AccountClass::Expenses,
    ];

    /// Class of a normalized code
    pub fn from_code(code: &str) -> Option<Self> {
        let first = code.split('.').next()?;
        Self::ALL.into_iter().find(|class| class.prefix() == first)
    }

    /// Root code of the class
    pub fn prefix(&self) -> &'static str {
        match self {
            AccountClass::Assets => "1",
            AccountClass::Liabilities => "2",
            AccountClass::Equity => "3",
            AccountClass::Revenue => "4",
            AccountClass::Expenditure => "5",
            AccountClass::Financing => "6",
            AccountClass::OperationalRevenue => "7",
            AccountClass::Expenses => "8",
        }
    }

    /// Report title used in the regional chart of accounts
    pub fn title(&self) -> &'static str {
        match self {
            AccountClass::Assets => "ASET",
            AccountClass::Liabilities => "KEWAJIBAN",
            AccountClass::Equity => "EKUITAS",
            AccountClass::Revenue => "PENDAPATAN DAERAH",
            AccountClass::Expenditure => "BELANJA DAERAH",
            AccountClass::Financing => "PEMBIAYAAN DAERAH",
            AccountClass::OperationalRevenue => "PENDAPATAN DAERAH-LO",
            AccountClass::Expenses => "BEBAN DAERAH",
        }
    }
}

impl std::str::FromStr for AccountClass {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if let Some(class) = Self::ALL
            .into_iter()
            .find(|class| class.prefix() == lowered || class.title().to_lowercase() == lowered)
        {
            return Ok(class);
        }
        match lowered.as_str() {
            "assets" | "asset" => Ok(AccountClass::Assets),
            "liabilities" | "liability" => Ok(AccountClass::Liabilities),
            "equity" => Ok(AccountClass::Equity),
            "revenue" => Ok(AccountClass::Revenue),
            "expenditure" => Ok(AccountClass::Expenditure),
            "financing" => Ok(AccountClass::Financing),
            "operational_revenue" => Ok(AccountClass::OperationalRevenue),
            "expenses" | "expense" => Ok(AccountClass::Expenses),
            _ => Err(format!("Invalid account class: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountClass::Assets => write!(f, "assets"),
            AccountClass::Liabilities => write!(f, "liabilities"),
            AccountClass::Equity => write!(f, "equity"),
            AccountClass::Revenue => write!(f, "revenue"),
            AccountClass::Expenditure => write!(f, "expenditure"),
            AccountClass::Financing => write!(f, "financing"),
            AccountClass::OperationalRevenue => write!(f, "operational_revenue"),
            AccountClass::Expenses => write!(f, "expenses"),
        }
    }
}

/// Side on which a category grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    Debit,
    Credit,
}

impl NormalBalance {
    /// Signed balance of a debit/credit pair, `None` on overflow
    pub fn balance(&self, debit: Decimal, credit: Decimal) -> Option<Decimal> {
        match self {
            NormalBalance::Debit => debit.checked_sub(credit),
            NormalBalance::Credit => credit.checked_sub(debit),
        }
    }
}

impl std::fmt::Display for NormalBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalBalance::Debit => write!(f, "debit"),
            NormalBalance::Credit => write!(f, "credit"),
        }
    }
}

/// Add `amount` to `total`, failing with `AmountOverflow` for `account`
pub(crate) fn add_amount(total: Decimal, amount: Decimal, account: &str) -> CoreResult<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| CoreError::AmountOverflow { account: account.to_string() })
}

/// Budget category of a code, which fixes its sign convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// "4"
    Revenue,
    /// "5"
    Expenditure,
    /// "6.1"
    FinancingInflow,
    /// "6.2"
    FinancingOutflow,
    /// "6" and any other financing subgroup
    OtherFinancing,
    /// Every code outside the budget classes
    NonBudget,
}

impl Category {
    pub fn from_code(code: &str) -> Self {
        let mut segments = code.split('.');
        match (segments.next(), segments.next()) {
            (Some("4"), _) => Category::Revenue,
            (Some("5"), _) => Category::Expenditure,
            (Some("6"), Some("1")) => Category::FinancingInflow,
            (Some("6"), Some("2")) => Category::FinancingOutflow,
            (Some("6"), _) => Category::OtherFinancing,
            _ => Category::NonBudget,
        }
    }

    pub fn normal_balance(&self) -> NormalBalance {
        match self {
            Category::Revenue | Category::FinancingInflow => NormalBalance::Credit,
            Category::Expenditure
            | Category::FinancingOutflow
            | Category::OtherFinancing
            | Category::NonBudget => NormalBalance::Debit,
        }
    }

    /// Sign-adjusted balance of a debit/credit pair for this category
    pub fn balance(&self, debit: Decimal, credit: Decimal) -> Option<Decimal> {
        self.normal_balance().balance(debit, credit)
    }

    /// Sign-adjusted balance, failing with `AmountOverflow` for `account`
    pub(crate) fn checked_balance(&self, debit: Decimal, credit: Decimal, account: &str) -> CoreResult<Decimal> {
        self.balance(debit, credit)
            .ok_or_else(|| CoreError::AmountOverflow { account: account.to_string() })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Revenue => write!(f, "revenue"),
            Category::Expenditure => write!(f, "expenditure"),
            Category::FinancingInflow => write!(f, "financing inflow"),
            Category::FinancingOutflow => write!(f, "financing outflow"),
            Category::OtherFinancing => write!(f, "other financing"),
            Category::NonBudget => write!(f, "non-budget"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_class_from_code() {
        assert_eq!(AccountClass::from_code("4.1.1"), Some(AccountClass::Revenue));
        assert_eq!(AccountClass::from_code("6"), Some(AccountClass::Financing));
        assert_eq!(AccountClass::from_code("8.1"), Some(AccountClass::Expenses));
        assert_eq!(AccountClass::from_code("9.1"), None);
        assert_eq!(AccountClass::from_code("41.1"), None);
    }

    #[test]
    fn test_account_class_parse() {
        assert_eq!("5".parse::<AccountClass>().unwrap(), AccountClass::Expenditure);
        assert_eq!("Belanja Daerah".parse::<AccountClass>().unwrap(), AccountClass::Expenditure);
        assert_eq!("assets".parse::<AccountClass>().unwrap(), AccountClass::Assets);
        assert!("budget".parse::<AccountClass>().is_err());
        assert_eq!(AccountClass::OperationalRevenue.title(), "PENDAPATAN DAERAH-LO");
    }

    #[test]
    fn test_category_from_code() {
        assert_eq!(Category::from_code("4.1.1"), Category::Revenue);
        assert_eq!(Category::from_code("5"), Category::Expenditure);
        assert_eq!(Category::from_code("6.1.01"), Category::FinancingInflow);
        assert_eq!(Category::from_code("6.2"), Category::FinancingOutflow);
        assert_eq!(Category::from_code("6.3.1"), Category::OtherFinancing);
        assert_eq!(Category::from_code("6.10"), Category::OtherFinancing);
        assert_eq!(Category::from_code("1.1"), Category::NonBudget);
    }

    #[test]
    fn test_sign_conventions() {
        assert_eq!(Category::Revenue.balance(dec!(0), dec!(100)), Some(dec!(100)));
        assert_eq!(Category::Expenditure.balance(dec!(100), dec!(0)), Some(dec!(100)));
        assert_eq!(Category::Expenditure.balance(dec!(0), dec!(100)), Some(dec!(-100)));
        assert_eq!(Category::FinancingInflow.balance(dec!(20), dec!(50)), Some(dec!(30)));
        assert_eq!(Category::FinancingOutflow.balance(dec!(50), dec!(20)), Some(dec!(30)));
        assert_eq!(Category::NonBudget.balance(dec!(5), dec!(2)), Some(dec!(3)));
    }

    #[test]
    fn test_overflowing_amounts() {
        assert_eq!(Category::Revenue.balance(Decimal::MIN, Decimal::MAX), None);
        let err = Category::Expenditure
            .checked_balance(Decimal::MAX, Decimal::MIN, "5.1.1")
            .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { ref account } if account == "5.1.1"));

        assert_eq!(add_amount(dec!(1), dec!(2), "4").unwrap(), dec!(3));
        assert!(add_amount(Decimal::MAX, dec!(1), "4").is_err());
    }
}
