//! Modifier wizard
//!
//! ```text
//! Closed ──open──▶ SizeSelect ──confirm_size──▶ SweetnessSelect ──commit──▶ Closed
//!   ▲                  │                             │
//!   └──────cancel──────┴─────────────cancel──────────┘
//! ```
//!
//! Products without sizes skip the wizard and go straight into the cart at
//! base price. Out-of-stock products are rejected before any state change.

use rust_decimal::Decimal;
use shared::models::{CartLine, Product, SizeOption, SugarLevel};

use crate::cart::CartStore;
use crate::error::{CheckoutError, CheckoutResult};

/// Current wizard step
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModifierStep {
    #[default]
    Closed,
    SizeSelect {
        product: Product,
        size_id: i64,
    },
    SweetnessSelect {
        product: Product,
        size_id: i64,
        sugar: SugarLevel,
    },
}

impl ModifierStep {
    pub fn name(&self) -> &'static str {
        match self {
            ModifierStep::Closed => "closed",
            ModifierStep::SizeSelect { .. } => "size",
            ModifierStep::SweetnessSelect { .. } => "sweetness",
        }
    }
}

/// Result of [`ModifierSelectionFlow::open`]
#[derive(Debug, Clone, PartialEq)]
pub enum OpenOutcome {
    /// No sizes: the line went straight into the cart
    Added(CartLine),
    /// Wizard is waiting for a size
    ChooseSize,
}

#[derive(Debug, Clone, Default)]
pub struct ModifierSelectionFlow {
    step: ModifierStep,
}

impl ModifierSelectionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &ModifierStep {
        &self.step
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.step, ModifierStep::Closed)
    }

    /// Start selection for `product`. Any unfinished selection is discarded.
    pub fn open(&mut self, product: &Product, cart: &mut CartStore) -> CheckoutResult<OpenOutcome> {
        if product.is_out_of_stock() {
            tracing::debug!(product_id = product.id, "Out-of-stock product refused");
            return Err(CheckoutError::OutOfStock(product.name.clone()));
        }
        self.step = ModifierStep::Closed;

        if !product.has_sizes() {
            let line = CartLine::plain(product.id, product.name.clone(), product.price);
            cart.add(line.clone());
            return Ok(OpenOutcome::Added(line));
        }

        let first = product
            .first_available_size()
            .ok_or_else(|| CheckoutError::NoAvailableSize(product.name.clone()))?;
        self.step = ModifierStep::SizeSelect {
            size_id: first.id,
            product: product.clone(),
        };
        Ok(OpenOutcome::ChooseSize)
    }

    /// Change the highlighted size
    pub fn choose_size(&mut self, size_id: i64) -> CheckoutResult<()> {
        let ModifierStep::SizeSelect { product, size_id: selected } = &mut self.step else {
            return Err(self.wrong_step("choose_size"));
        };
        match product.size(size_id) {
            Some(size) if size.available => {
                *selected = size_id;
                Ok(())
            }
            _ => Err(CheckoutError::SizeUnavailable {
                product: product.name.clone(),
                size_id,
            }),
        }
    }

    /// Size → sweetness; sugar starts at 100%
    pub fn confirm_size(&mut self) -> CheckoutResult<()> {
        match std::mem::take(&mut self.step) {
            ModifierStep::SizeSelect { product, size_id } => {
                self.step = ModifierStep::SweetnessSelect {
                    product,
                    size_id,
                    sugar: SugarLevel::default(),
                };
                Ok(())
            }
            other => {
                self.step = other;
                Err(self.wrong_step("confirm_size"))
            }
        }
    }

    pub fn choose_sugar(&mut self, level: SugarLevel) -> CheckoutResult<()> {
        let ModifierStep::SweetnessSelect { sugar, .. } = &mut self.step else {
            return Err(self.wrong_step("choose_sugar"));
        };
        *sugar = level;
        Ok(())
    }

    /// Package the selection into a line and add it to the cart
    pub fn commit(&mut self, cart: &mut CartStore) -> CheckoutResult<CartLine> {
        let ModifierStep::SweetnessSelect { product, size_id, sugar } = &self.step else {
            return Err(self.wrong_step("commit"));
        };
        let size = Self::resolve_size(product, *size_id)?;
        let line = CartLine::with_modifiers(
            product.id,
            product.name.clone(),
            size.label.clone(),
            size.id,
            size.price,
            *sugar,
        );
        cart.add(line.clone());
        self.step = ModifierStep::Closed;
        Ok(line)
    }

    /// Discard the selection; the cart is untouched
    pub fn cancel(&mut self) {
        if self.is_open() {
            tracing::debug!(step = self.step.name(), "Modifier selection cancelled");
        }
        self.step = ModifierStep::Closed;
    }

    /// Unit price of the size currently selected
    pub fn pending_price(&self) -> Option<Decimal> {
        match &self.step {
            ModifierStep::Closed => None,
            ModifierStep::SizeSelect { product, size_id }
            | ModifierStep::SweetnessSelect { product, size_id, .. } => {
                product.size(*size_id).map(|s| s.price)
            }
        }
    }

    fn resolve_size(product: &Product, size_id: i64) -> CheckoutResult<&SizeOption> {
        product
            .size(size_id)
            .filter(|s| s.available)
            .ok_or_else(|| CheckoutError::SizeUnavailable {
                product: product.name.clone(),
                size_id,
            })
    }

    fn wrong_step(&self, action: &str) -> CheckoutError {
        CheckoutError::InvalidModifierState(format!("{} not allowed at {} step", action, self.step.name()))
    }
}
