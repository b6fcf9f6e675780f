use {
    crate::{Result, TypesError},
    serde::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    std::{fmt, str::FromStr},
};

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Coin {
    pub denom: String,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
}

impl Coin {
    pub fn new<T>(denom: T, amount: u128) -> Self
    where
        T: Into<String>,
    {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A normalized list of coins: sorted by denom, no zero amounts, no duplicates.
///
/// Serialized to JSON as `[{"denom":..,"amount":".."}]`; displayed in the
/// comma-separated form used in event attributes, e.g. `5stake,10uatom`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_from_iter<I>(coins: I) -> Result<Self>
    where
        I: IntoIterator<Item = Coin>,
    {
        let mut coins = coins
            .into_iter()
            .filter(|coin| coin.amount > 0)
            .collect::<Vec<_>>();

        coins.sort_by(|a, b| a.denom.cmp(&b.denom));

        if let Some(pair) = coins.windows(2).find(|pair| pair[0].denom == pair[1].denom) {
            return Err(TypesError::InvalidCoin(format!("duplicate denom {}", pair[0].denom)));
        }

        Ok(Self(coins))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }
}

impl FromStr for Coins {
    type Err = TypesError;

    /// Decimal amounts are accepted and truncated to integers.
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(Self::new());
        }

        let coins = s
            .split(',')
            .map(|raw| parse_coin(raw.trim()))
            .collect::<Result<Vec<_>>>()?;

        Self::try_from_iter(coins)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, coin) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}

fn parse_coin(raw: &str) -> Result<Coin> {
    let split = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .ok_or_else(|| TypesError::InvalidCoin(raw.to_string()))?;
    let (amount, denom) = raw.split_at(split);

    let integer = amount.split('.').next().unwrap_or_default();
    if integer.is_empty() || amount.matches('.').count() > 1 || !is_valid_denom(denom) {
        return Err(TypesError::InvalidCoin(raw.to_string()));
    }

    let amount = integer
        .parse()
        .map_err(|_| TypesError::InvalidCoin(raw.to_string()))?;

    Ok(Coin::new(denom, amount))
}

fn is_valid_denom(denom: &str) -> bool {
    let mut chars = denom.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    first.is_ascii_alphabetic()
        && (3..=128).contains(&denom.len())
        && chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c))
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*, serde_json::json, test_case::test_case};

    #[test_case("5stake,10uatom", "5stake,10uatom" ; "already sorted")]
    #[test_case("10uatom, 5stake", "5stake,10uatom" ; "unsorted with spaces")]
    #[test_case("0uatom,5stake", "5stake" ; "zero amounts dropped")]
    #[test_case("12.75uatom", "12uatom" ; "decimal truncated")]
    #[test_case("10ibc/27394FB092D2ECCD", "10ibc/27394FB092D2ECCD" ; "ibc denom")]
    #[test_case("", "" ; "empty")]
    fn normalizing(input: &str, expected: &str) {
        let coins = input.parse::<Coins>().unwrap();
        assert_that!(coins.to_string()).is_equal_to(expected.to_string());
    }

    #[test_case("uatom" ; "no amount")]
    #[test_case("10" ; "no denom")]
    #[test_case("10u" ; "short denom")]
    #[test_case("1uatom,2uatom" ; "duplicate")]
    #[test_case("1.2.3uatom" ; "two dots")]
    fn rejecting(input: &str) {
        assert!(input.parse::<Coins>().is_err());
    }

    #[test]
    fn json_form() {
        let coins = "10uatom,5stake".parse::<Coins>().unwrap();

        assert_that!(serde_json::to_value(&coins).unwrap()).is_equal_to(json!([
            { "denom": "stake", "amount": "5" },
            { "denom": "uatom", "amount": "10" },
        ]));
    }
}
