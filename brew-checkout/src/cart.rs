//! In-memory cart
//!
//! Lines merge by product id alone: adding a product that is already in
//! the cart bumps its quantity and keeps the first line's size and sugar,
//! even when the second add chose different modifiers.

use shared::models::CartLine;

/// Most units a single line can carry
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Current line items of the terminal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from saved lines (held or pending-payment snapshot)
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            match cart.find_mut(line.product_id) {
                Some(existing) => existing.quantity = bounded(existing.quantity, line.quantity),
                None => cart.lines.push(CartLine {
                    quantity: line.quantity.min(MAX_LINE_QUANTITY),
                    ..line
                }),
            }
        }
        cart
    }

    /// Add one unit. Existing line for the same product: quantity + 1.
    /// Otherwise the line is appended with quantity 1.
    pub fn add(&mut self, mut line: CartLine) {
        if let Some(existing) = self.find_mut(line.product_id) {
            existing.quantity = bounded(existing.quantity, 1);
            tracing::debug!(
                product_id = existing.product_id,
                quantity = existing.quantity,
                "Merged into existing cart line"
            );
            return;
        }
        line.quantity = 1;
        tracing::debug!(product_id = line.product_id, name = %line.name, "Cart line added");
        self.lines.push(line);
    }

    /// Remove every line for the product
    pub fn remove(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Overwrite the quantity; zero or negative removes the line, anything
    /// above [`MAX_LINE_QUANTITY`] is capped
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        let quantity = u32::try_from(quantity)
            .unwrap_or(MAX_LINE_QUANTITY)
            .min(MAX_LINE_QUANTITY);
        for line in self.lines.iter_mut().filter(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn get(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Total number of units across lines
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    fn find_mut(&mut self, product_id: i64) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }
}

fn bounded(quantity: u32, extra: u32) -> u32 {
    let total = quantity.saturating_add(extra);
    if total > MAX_LINE_QUANTITY {
        tracing::warn!(requested = total, max = MAX_LINE_QUANTITY, "Line quantity capped");
    }
    total.min(MAX_LINE_QUANTITY)
}
