//! Interactive register driven by operator commands

use std::sync::Arc;

use brew_checkout::{
    CashCheckout, CashState, CheckoutConfig, CheckoutError, CheckoutResult, CompletionSource,
    GcashCheckout, GcashSession, GcashState, HoldOrchestrator, LocalStore, ModifierSelectionFlow,
    ModifierStep, OpenOutcome, PricingEngine, Register, SalesBackend, SessionContext,
};
use brew_client::BrewApi;
use shared::error::AppError;
use shared::models::Product;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{Command, HELP};

pub struct Terminal {
    api: Arc<BrewApi>,
    catalog: Vec<Product>,
    register: Register,
    session: SessionContext,
    wizard: ModifierSelectionFlow,
    cash: CashCheckout,
    hold: HoldOrchestrator,
    gcash: GcashCheckout,
    active: Option<GcashSession>,
}

impl Terminal {
    pub fn new(api: Arc<BrewApi>, store: LocalStore, config: &CheckoutConfig) -> Self {
        let register = Register::new(PricingEngine::new(config.tax_percent));
        let operator = api.claims().cloned().map(Into::into).unwrap_or_default();
        let cash = CashCheckout::new(api.clone(), store.clone(), register.clone());
        let hold = HoldOrchestrator::new(
            api.clone(),
            store.clone(),
            register.clone(),
            config.hold_settle_delay,
        );
        let gcash = GcashCheckout::new(
            api.clone(),
            api.clone(),
            store,
            register.clone(),
            config.gcash.clone(),
        );
        Self {
            api,
            catalog: Vec::new(),
            register,
            session: SessionContext::new(operator),
            wizard: ModifierSelectionFlow::new(),
            cash,
            hold,
            gcash,
            active: None,
        }
    }

    pub async fn load_catalog(&mut self) -> CheckoutResult<()> {
        self.catalog = self.api.fetch_catalog().await?;
        tracing::info!(items = self.catalog.len(), "Catalog loaded");
        Ok(())
    }

    /// Mention GCash sessions a previous run left open
    pub fn announce_pending(&self) -> CheckoutResult<()> {
        let pending = self.gcash.pending_sessions()?;
        if !pending.is_empty() {
            println!("{} GCash payment(s) still open, see 'pending'", pending.len());
        }
        Ok(())
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            self.reap_session();
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            if let Err(e) = self.execute(command).await {
                tracing::warn!(error = %e, "Command failed");
                let err = AppError::from(e);
                println!("! {}", err.message);
                if let Some(accepted) = err.detail("accepted").and_then(|v| v.as_array())
                    && !accepted.is_empty()
                {
                    println!("  already recorded: {:?}", accepted);
                }
            }
        }

        if let Some(session) = self.active.take() {
            // Snapshot stays on disk; `pending` offers it next run
            tracing::info!(reference_id = %session.reference_id(), "Leaving GCash session open");
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> CheckoutResult<()> {
        match command {
            Command::Menu => self.print_menu(),
            Command::Cart => self.print_cart(),
            Command::Add(product_id) => {
                let product = self.product(product_id)?;
                let wizard = &mut self.wizard;
                match self.register.edit(|cart| wizard.open(&product, cart))?? {
                    OpenOutcome::Added(line) => println!("+ {} {}", line.name, line.unit_price),
                    OpenOutcome::ChooseSize => self.print_step(),
                }
            }
            Command::Size(size_id) => {
                self.wizard.choose_size(size_id)?;
                self.print_step();
            }
            Command::Next => {
                self.wizard.confirm_size()?;
                self.print_step();
            }
            Command::Sugar(level) => {
                self.wizard.choose_sugar(level)?;
                self.print_step();
            }
            Command::Commit => {
                let wizard = &mut self.wizard;
                let line = self.register.edit(|cart| wizard.commit(cart))??;
                println!(
                    "+ {} {} {} {}",
                    line.name,
                    line.selected_size.as_deref().unwrap_or_default(),
                    line.sugar_level.map(|s| s.label()).unwrap_or_default(),
                    line.unit_price
                );
            }
            Command::Cancel => {
                if self.wizard.is_open() {
                    self.wizard.cancel();
                } else if !matches!(self.cash.state(), CashState::Idle | CashState::Completed(_)) {
                    self.cash.cancel(&mut self.session);
                    println!("Cash checkout cancelled, cart kept");
                }
            }
            Command::Quantity {
                product_id,
                quantity,
            } => {
                self.register
                    .edit(|cart| cart.set_quantity(product_id, quantity))?;
                self.print_cart();
            }
            Command::Remove(product_id) => {
                self.register.edit(|cart| cart.remove(product_id))?;
                self.print_cart();
            }
            Command::Clear => {
                if let Some(marker) = self.register.clear(&mut self.session)? {
                    tracing::info!(held_ids = ?marker.held_ids(), "Reopened hold left unsettled");
                }
            }
            Command::Discount(discount) => {
                self.register.set_discount(discount)?;
                self.print_cart();
            }
            Command::Cash(tendered) => {
                let due = self.cash.begin()?;
                match tendered {
                    Some(amount) => {
                        let change = self.cash.enter_tendered(amount)?;
                        println!("Amount due {}, change {}. 'confirm' to submit", due, change);
                    }
                    None => println!("Amount due {}. 'tender <amount>' then 'confirm'", due),
                }
            }
            Command::Tender(amount) => {
                let change = self.cash.enter_tendered(amount)?;
                println!("Change {}", change);
            }
            Command::Confirm => {
                let receipt = self.cash.confirm(&mut self.session).await?;
                if receipt.resumed.is_empty() {
                    println!("Paid {}, change {}", receipt.grand_total, receipt.change);
                } else {
                    println!(
                        "Settled held {:?}, change {}",
                        receipt.resumed, receipt.change
                    );
                }
            }
            Command::Hold => {
                let report = self.hold.hold(&self.session).await?;
                println!("Held: {}", report.names().join(", "));
            }
            Command::Holds => {
                for held in self.hold.held_transactions().await? {
                    println!(
                        "#{} item {} x{} ({}% off) {}",
                        held.id,
                        held.menu_item_id,
                        held.quantity,
                        held.discount_percent.value(),
                        held.created_at
                    );
                }
            }
            Command::Reopen(ids) => {
                let mut held = self.hold.held_transactions().await?;
                if !ids.is_empty() {
                    held.retain(|h| ids.contains(&h.id));
                    if let Some(missing) = ids.iter().find(|id| !held.iter().any(|h| h.id == **id)) {
                        return Err(CheckoutError::HeldNotFound(*missing));
                    }
                }
                self.hold.reopen(&held, &self.catalog, &mut self.session)?;
                self.print_cart();
            }
            Command::Gcash => {
                let session = self.gcash.start(&self.session).await?;
                self.show_session(session);
            }
            Command::Check => match &self.active {
                Some(session) => {
                    session.check_now();
                    println!("{}", describe(&session.state()));
                }
                None => println!("No GCash payment open"),
            },
            Command::Close => {
                if let Some(session) = self.active.take() {
                    session.close();
                    println!("{}", describe(&session.state()));
                }
            }
            Command::Pending => {
                for record in self.gcash.pending_sessions()? {
                    println!(
                        "{} {} ({} lines)",
                        record.reference_id,
                        record.grand_total,
                        record.cart_lines.len()
                    );
                }
            }
            Command::Reattach(reference_id) => {
                let record = self
                    .gcash
                    .pending_sessions()?
                    .into_iter()
                    .find(|r| r.reference_id == reference_id)
                    .ok_or_else(|| {
                        CheckoutError::SessionClosed(format!("no open payment {}", reference_id))
                    })?;
                let session = self.gcash.reattach(record)?;
                self.show_session(session);
            }
            Command::Discard(reference_id) => {
                if self.gcash.discard_pending(&reference_id)? {
                    println!("Forgot {}", reference_id);
                } else {
                    println!("No open payment {}", reference_id);
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
        Ok(())
    }

    fn product(&self, product_id: i64) -> CheckoutResult<Product> {
        self.catalog
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or(CheckoutError::ProductNotFound(product_id))
    }

    fn show_session(&mut self, session: GcashSession) {
        println!("GCash {} for {}", session.reference_id(), session.grand_total());
        if let Some(url) = session.checkout_url() {
            println!("Scan or open {}", url);
        }
        let mut states = session.subscribe();
        let reference_id = session.reference_id().to_string();
        tokio::spawn(async move {
            while states.changed().await.is_ok() {
                let state = states.borrow_and_update().clone();
                println!("[{}] {}", reference_id, describe(&state));
                if state.is_terminal() {
                    break;
                }
            }
        });
        self.active = Some(session);
    }

    /// Forget a session once it has settled
    fn reap_session(&mut self) {
        if self.active.as_ref().is_some_and(|s| s.outcome().is_some()) {
            self.active = None;
        }
    }

    fn print_menu(&self) {
        for product in &self.catalog {
            let stock = if product.is_out_of_stock() { " (out of stock)" } else { "" };
            println!("{:>4}  {:<24} {:>8}{}", product.id, product.name, product.price, stock);
            for size in &product.sizes {
                let mark = if size.available { "" } else { " (unavailable)" };
                println!("      size {:>4} {:<10} {:>8}{}", size.id, size.label, size.price, mark);
            }
        }
    }

    fn print_cart(&self) {
        let snapshot = self.register.snapshot();
        for line in &snapshot.lines {
            println!(
                "{:>4}  {:<24} x{:<3} {:>8}",
                line.product_id,
                line.name,
                line.quantity,
                line.line_total()
            );
        }
        let pricing = snapshot.pricing;
        println!(
            "Subtotal {}  VAT {}%: {}  Discount {}%: -{}  Total {}",
            pricing.subtotal,
            snapshot.tax_percent,
            pricing.tax_amount,
            snapshot.discount.value(),
            pricing.discount_amount,
            pricing.grand_total
        );
        if let Some(marker) = self.session.resume_marker() {
            println!("Reopened from hold {:?}", marker.held_ids());
        }
    }

    fn print_step(&self) {
        match self.wizard.step() {
            ModifierStep::SizeSelect { product, size_id } => {
                let sizes: Vec<String> = product
                    .sizes
                    .iter()
                    .filter(|s| s.available)
                    .map(|s| {
                        let mark = if s.id == *size_id { "*" } else { "" };
                        format!("{}{} {} {}", mark, s.id, s.label, s.price)
                    })
                    .collect();
                println!("{}: size {}  then 'next'", product.name, sizes.join(" | "));
            }
            ModifierStep::SweetnessSelect { product, sugar, .. } => {
                println!(
                    "{}: sugar {} at {}  then 'commit'",
                    product.name,
                    sugar,
                    self.wizard.pending_price().unwrap_or_default()
                );
            }
            ModifierStep::Closed => {}
        }
    }
}

fn describe(state: &GcashState) -> String {
    match state {
        GcashState::AwaitingAuthorization { provider_status } => {
            format!("waiting for payment ({})", provider_status)
        }
        GcashState::Completing => "authorized, completing".to_string(),
        GcashState::Completed(CompletionSource::Webhook) => "paid".to_string(),
        GcashState::Completed(CompletionSource::ManualCompletion) => "paid, sale recorded".to_string(),
        GcashState::Cancelled => "closed, cart kept".to_string(),
        GcashState::Expired => "expired, cart kept".to_string(),
    }
}
