//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Danish Krone."]
        Dkk = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Swedish Krona."]
        Sek = 3,
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45DKK").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Dkk,
            },
        );

        assert_eq!(
            Money::from_str("123.45EUR").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Eur,
            },
        );

        assert_eq!(
            Money::from_str("123.45SEK").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Sek,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Dk").is_err());
        assert!(Money::from_str("123.45Dkroner").is_err());

        assert!(Money::from_str("123.00DKK").is_ok());
        assert!(Money::from_str("123.0DKK").is_ok());
        assert!(Money::from_str("123DKK").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Money {
                amount: decimal("123.45"),
                currency: Currency::Dkk,
            }
            .to_string(),
            "123.45DKK",
        );

        assert_eq!(
            Money {
                amount: decimal("3000000"),
                currency: Currency::Dkk,
            }
            .to_string(),
            "3000000DKK",
        );

        assert_eq!(
            Money {
                amount: decimal("123.00"),
                currency: Currency::Eur,
            }
            .to_string(),
            "123EUR",
        );
        assert_eq!(
            Money {
                amount: decimal("123.0"),
                currency: Currency::Sek,
            }
            .to_string(),
            "123SEK",
        );
    }
}
