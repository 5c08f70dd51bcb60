//! In-memory shopping cart.
//!
//! Lines are keyed by product id and kept in insertion order. Totals are
//! recomputed on every call; nothing here is persisted.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product. Repeated adds of the same id bump the
    /// quantity of the existing line; the name and price of the first add
    /// are kept.
    pub fn add_item(&mut self, id: i64, name: &str, unit_price: f64) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == id) {
            existing.quantity += 1;
            return;
        }
        self.items.push(CartItem {
            id,
            name: name.to_string(),
            unit_price,
            quantity: 1,
        });
    }

    pub fn remove_all(&mut self) {
        self.items.clear();
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Number of units across all lines.
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Format an amount the way the till shows it: `$12.50`.
pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Multi-line cart summary for the cart panel.
pub fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }
    let mut out = String::new();
    for item in cart.items() {
        out.push_str(&format!(
            "{}\n    {} x {}  {}\n",
            item.name,
            item.quantity,
            format_money(item.unit_price),
            format_money(item.line_total()),
        ));
    }
    out.push_str(&format!(
        "Items: {}  Total: {}",
        cart.count(),
        format_money(cart.total())
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_increments_quantity() {
        let mut cart = Cart::new();
        cart.add_item(1, "Water", 0.5);
        cart.add_item(1, "Water", 0.5);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn distinct_ids_make_separate_lines() {
        let mut cart = Cart::new();
        cart.add_item(1, "Water", 0.5);
        cart.add_item(2, "Bread", 1.25);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].id, 1);
        assert_eq!(cart.items()[1].id, 2);
    }

    #[test]
    fn totals_follow_lines() {
        let mut cart = Cart::new();
        cart.add_item(1, "Cheese", 10.0);
        cart.add_item(1, "Cheese", 10.0);
        cart.add_item(2, "Milk", 5.0);
        assert_eq!(cart.total(), 25.0);
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn remove_all_resets_totals() {
        let mut cart = Cart::new();
        cart.add_item(4, "Eggs", 3.2);
        cart.remove_all();
        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), 0.0);
    }

    #[test]
    fn render_shows_lines_and_total() {
        let mut cart = Cart::new();
        cart.add_item(1, "Cheese", 10.0);
        cart.add_item(1, "Cheese", 10.0);
        let text = render_cart(&cart);
        assert!(text.contains("2 x $10.00  $20.00"));
        assert!(text.ends_with("Items: 2  Total: $20.00"));
        assert_eq!(render_cart(&Cart::new()), "Your cart is empty.");
    }
}
