//! Operator command line parsing

use std::str::FromStr;

use shared::models::{DiscountPercent, InvalidDiscount, SugarLevel};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Menu,
    Cart,
    Add(i64),
    Size(i64),
    Next,
    Sugar(SugarLevel),
    Commit,
    Cancel,
    Quantity { product_id: i64, quantity: i64 },
    Remove(i64),
    Clear,
    Discount(DiscountPercent),
    /// Open cash checkout, optionally tendering right away
    Cash(Option<f64>),
    Tender(f64),
    Confirm,
    Hold,
    Holds,
    /// Empty: every held record
    Reopen(Vec<i64>),
    Gcash,
    Check,
    Close,
    Pending,
    Reattach(String),
    /// Forget a saved GCash session without polling it
    Discard(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("'{value}' is not a valid {what}")]
    InvalidArgument { value: String, what: &'static str },

    #[error(transparent)]
    Discount(#[from] InvalidDiscount),
}

fn arg<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    what: &'static str,
) -> Result<&'a str, ParseError> {
    args.next()
        .ok_or(ParseError::MissingArgument { command, what })
}

fn number<T: FromStr>(value: &str, what: &'static str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidArgument {
        value: value.to_string(),
        what,
    })
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Help);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "menu" | "m" => Command::Menu,
            "cart" | "total" => Command::Cart,
            "add" | "a" => Command::Add(number(arg(&mut words, "add", "a product id")?, "product id")?),
            "size" => Command::Size(number(arg(&mut words, "size", "a size id")?, "size id")?),
            "next" => Command::Next,
            "sugar" => {
                let raw = arg(&mut words, "sugar", "a level (0, 25, 50, 75, 100)")?;
                let percent: u8 = number(raw.trim_end_matches('%'), "sugar level")?;
                Command::Sugar(SugarLevel::from_percent(percent).ok_or_else(|| {
                    ParseError::InvalidArgument {
                        value: raw.to_string(),
                        what: "sugar level",
                    }
                })?)
            }
            "commit" | "ok" => Command::Commit,
            "cancel" => Command::Cancel,
            "qty" => Command::Quantity {
                product_id: number(arg(&mut words, "qty", "a product id")?, "product id")?,
                quantity: number(arg(&mut words, "qty", "a quantity")?, "quantity")?,
            },
            "rm" | "remove" => Command::Remove(number(arg(&mut words, "rm", "a product id")?, "product id")?),
            "clear" => Command::Clear,
            "discount" => {
                let raw = arg(&mut words, "discount", "a percentage")?;
                let percent: u8 = number(raw.trim_end_matches('%'), "discount")?;
                Command::Discount(DiscountPercent::new(percent)?)
            }
            "cash" => Command::Cash(words.next().map(|w| number(w, "amount")).transpose()?),
            "tender" => Command::Tender(number(arg(&mut words, "tender", "an amount")?, "amount")?),
            "confirm" => Command::Confirm,
            "hold" => Command::Hold,
            "holds" => Command::Holds,
            "reopen" => Command::Reopen(
                words
                    .by_ref()
                    .map(|w| number::<i64>(w, "held id"))
                    .collect::<Result<_, _>>()?,
            ),
            "gcash" => Command::Gcash,
            "check" => Command::Check,
            "close" => Command::Close,
            "pending" => Command::Pending,
            "reattach" => Command::Reattach(arg(&mut words, "reattach", "a reference id")?.to_string()),
            "discard" => Command::Discard(arg(&mut words, "discard", "a reference id")?.to_string()),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
menu                      list the catalog
add <id>                  add a product (opens size/sugar selection when it has sizes)
size <id> | next          pick a size, then continue to sweetness
sugar <0|25|50|75|100>    pick sweetness
commit | cancel           finish or abandon the selection
qty <id> <n> | rm <id>    change or remove a cart line
discount <pct> | clear    set the discount, empty the cart
cart                      show lines and totals
cash [amt] | tender <amt> | confirm
hold | holds | reopen [ids...]
gcash | check | close     GCash QR payment
pending | reattach <ref>  recover GCash sessions left open
discard <ref>             forget a GCash session left open
quit";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, ParseError> {
        line.parse()
    }

    #[test]
    fn test_cart_commands() {
        assert_eq!(parse("add 3").unwrap(), Command::Add(3));
        assert_eq!(parse("  QTY 3 0 ").unwrap(), Command::Quantity { product_id: 3, quantity: 0 });
        assert_eq!(parse("rm 2").unwrap(), Command::Remove(2));
        assert_eq!(parse("sugar 50%").unwrap(), Command::Sugar(SugarLevel::Half));
        assert_eq!(parse("discount 15").unwrap(), Command::Discount(DiscountPercent::new(15).unwrap()));
        assert_eq!(parse("").unwrap(), Command::Help);
    }

    #[test]
    fn test_checkout_commands() {
        assert_eq!(parse("tender 250.5").unwrap(), Command::Tender(250.5));
        assert_eq!(parse("cash").unwrap(), Command::Cash(None));
        assert_eq!(parse("cash 200").unwrap(), Command::Cash(Some(200.0)));
        assert_eq!(parse("reopen").unwrap(), Command::Reopen(vec![]));
        assert_eq!(parse("reopen 101 102").unwrap(), Command::Reopen(vec![101, 102]));
        assert_eq!(parse("reattach ref-9").unwrap(), Command::Reattach("ref-9".into()));
        assert_eq!(parse("discard ref-9").unwrap(), Command::Discard("ref-9".into()));
        assert!(matches!(parse("discard"), Err(ParseError::MissingArgument { command: "discard", .. })));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(parse("add"), Err(ParseError::MissingArgument { command: "add", .. })));
        assert!(matches!(parse("add latte"), Err(ParseError::InvalidArgument { .. })));
        assert!(matches!(parse("sugar 40"), Err(ParseError::InvalidArgument { .. })));
        assert!(matches!(parse("discount 30"), Err(ParseError::Discount(_))));
        assert!(matches!(parse("refund"), Err(ParseError::Unknown(_))));
    }
}
