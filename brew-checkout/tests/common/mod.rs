//! In-memory collaborators for the checkout flow suites

#![allow(dead_code)]

use async_trait::async_trait;
use brew_checkout::{
    BackendError, BackendResult, CashCheckout, GcashCheckout, GcashConfig, HoldOrchestrator,
    LocalStore, Operator, PaymentGateway, PricingEngine, Register, SalesBackend, SessionContext,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::models::{CartLine, HeldTransaction, Product, SizeOption};
use shared::payment::{
    ManualCompletion, PaymentIntent, PaymentIntentRequest, PaymentStatus, PaymentStatusReport,
    PendingPaymentRecord, QrCode,
};
use shared::request::{HoldLineRequest, PurchaseLineRequest};
use shared::response::{PurchaseReceipt, ResumeReceipt};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

pub const POLL: Duration = Duration::from_millis(10);
pub const WAIT: Duration = Duration::from_secs(3);

/// Scriptable sales backend and payment gateway with call counters
pub struct FakeBackend {
    pub purchases: Mutex<Vec<PurchaseLineRequest>>,
    pub holds: Mutex<Vec<HeldTransaction>>,
    pub hold_requests: Mutex<Vec<HoldLineRequest>>,
    pub resumed: Mutex<Vec<i64>>,
    pub pending: Mutex<Vec<PendingPaymentRecord>>,
    pub intents: Mutex<Vec<PaymentIntentRequest>>,
    pub status_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
    pub qr_calls: AtomicUsize,
    rejected: Mutex<HashMap<i64, String>>,
    statuses: Mutex<VecDeque<BackendResult<PaymentStatusReport>>>,
    steady_status: Mutex<PaymentStatusReport>,
    completions: Mutex<VecDeque<bool>>,
    fail_intent: AtomicBool,
    fail_qr: AtomicBool,
    fail_list: AtomicBool,
    fail_purchases: AtomicBool,
    fail_pending: AtomicBool,
    next_id: AtomicI64,
    next_ref: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            purchases: Mutex::default(),
            holds: Mutex::default(),
            hold_requests: Mutex::default(),
            resumed: Mutex::default(),
            pending: Mutex::default(),
            intents: Mutex::default(),
            status_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            qr_calls: AtomicUsize::new(0),
            rejected: Mutex::default(),
            statuses: Mutex::default(),
            steady_status: Mutex::new(PaymentStatusReport {
                completed: false,
                status: PaymentStatus::Pending,
            }),
            completions: Mutex::default(),
            fail_intent: AtomicBool::new(false),
            fail_qr: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            fail_purchases: AtomicBool::new(false),
            fail_pending: AtomicBool::new(false),
            next_id: AtomicI64::new(100),
            next_ref: AtomicUsize::new(1),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reject purchases, holds and resumes of this product
    pub fn reject_product(&self, product_id: i64, message: &str) {
        self.rejected.lock().insert(product_id, message.to_string());
    }

    pub fn accept_all(&self) {
        self.rejected.lock().clear();
        self.fail_purchases.store(false, Ordering::SeqCst);
    }

    /// Fail every purchase with a transport error
    pub fn fail_purchases(&self) {
        self.fail_purchases.store(true, Ordering::SeqCst);
    }

    /// Status answers consumed one per poll before the steady status applies
    pub fn script_statuses(&self, script: Vec<BackendResult<PaymentStatusReport>>) {
        self.statuses.lock().extend(script);
    }

    pub fn set_status(&self, status: PaymentStatus, completed: bool) {
        *self.steady_status.lock() = PaymentStatusReport { completed, status };
    }

    /// Manual completion answers, in order; afterwards completion succeeds
    pub fn script_completions(&self, script: Vec<bool>) {
        self.completions.lock().extend(script);
    }

    pub fn fail_intent(&self) {
        self.fail_intent.store(true, Ordering::SeqCst);
    }

    pub fn fail_qr(&self) {
        self.fail_qr.store(true, Ordering::SeqCst);
    }

    /// Fail the remote pending-payment snapshot
    pub fn fail_pending(&self) {
        self.fail_pending.store(true, Ordering::SeqCst);
    }

    pub fn fail_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn purchase_count(&self) -> usize {
        self.purchases.lock().len()
    }

    /// Product ids of recorded purchases, in arrival order
    pub fn purchased_ids(&self) -> Vec<i64> {
        self.purchases.lock().iter().map(|p| p.menu_item_id).collect()
    }

    /// Held id the backend assigned to this product
    pub fn held_id_of(&self, product_id: i64) -> i64 {
        self.holds
            .lock()
            .iter()
            .find(|h| h.menu_item_id == product_id)
            .map(|h| h.id)
            .unwrap()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    fn check_rejected(&self, product_id: i64) -> BackendResult<()> {
        match self.rejected.lock().get(&product_id) {
            Some(message) => Err(BackendError::Rejected {
                code: None,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SalesBackend for FakeBackend {
    async fn fetch_catalog(&self) -> BackendResult<Vec<Product>> {
        Ok(catalog())
    }

    async fn create_hold(&self, request: &HoldLineRequest) -> BackendResult<HeldTransaction> {
        // Let sibling requests start before this one answers
        tokio::task::yield_now().await;
        self.hold_requests.lock().push(request.clone());
        self.check_rejected(request.menu_item_id)?;
        let held = HeldTransaction {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            menu_item_id: request.menu_item_id,
            menu_item_size_id: request.menu_item_size_id,
            quantity: request.quantity,
            discount_percent: request.discount_percent,
            tax: request.tax,
            payment_method: request.payment_method,
            created_at: "2026-03-01T08:00:00Z".into(),
        };
        self.holds.lock().push(held.clone());
        Ok(held)
    }

    async fn list_holds(&self) -> BackendResult<Vec<HeldTransaction>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("connection refused".into()));
        }
        Ok(self.holds.lock().clone())
    }

    async fn resume_hold(&self, held_id: i64) -> BackendResult<ResumeReceipt> {
        let mut holds = self.holds.lock();
        let Some(pos) = holds.iter().position(|h| h.id == held_id) else {
            return Err(BackendError::Rejected {
                code: Some(4003),
                message: "Held transaction not found".into(),
            });
        };
        self.check_rejected(holds[pos].menu_item_id)?;
        holds.remove(pos);
        self.resumed.lock().push(held_id);
        Ok(ResumeReceipt {
            held_id,
            receipt: Some(format!("RESUMED #{}", held_id)),
        })
    }

    async fn submit_purchase(&self, request: &PurchaseLineRequest) -> BackendResult<PurchaseReceipt> {
        tokio::task::yield_now().await;
        if self.fail_purchases.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("timed out".into()));
        }
        self.check_rejected(request.menu_item_id)?;
        self.purchases.lock().push(request.clone());
        Ok(PurchaseReceipt {
            receipt: Some(format!("SOLD {} x{}", request.menu_item_id, request.quantity)),
        })
    }

    async fn save_pending_payment(&self, record: &PendingPaymentRecord) -> BackendResult<()> {
        if self.fail_pending.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("connection reset".into()));
        }
        self.pending.lock().push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for FakeBackend {
    async fn create_intent(&self, request: &PaymentIntentRequest) -> BackendResult<PaymentIntent> {
        if self.fail_intent.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected {
                code: Some(5002),
                message: "Provider unavailable".into(),
            });
        }
        self.intents.lock().push(request.clone());
        let n = self.next_ref.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentIntent {
            checkout_url: format!("https://pay.example/checkout/{}", n),
            reference_id: format!("ref-{}", n),
        })
    }

    async fn render_qr(&self, checkout_url: &str) -> BackendResult<QrCode> {
        self.qr_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_qr.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("qr service down".into()));
        }
        Ok(QrCode {
            qr_image: format!("data:image/png;base64,{}", checkout_url.len()),
        })
    }

    async fn payment_status(&self, _reference_id: &str) -> BackendResult<PaymentStatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.statuses.lock().pop_front() {
            return next;
        }
        Ok(*self.steady_status.lock())
    }

    async fn force_complete(&self, _reference_id: &str) -> BackendResult<ManualCompletion> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        let success = self.completions.lock().pop_front().unwrap_or(true);
        Ok(ManualCompletion {
            success,
            message: (!success).then(|| "Payment not yet chargeable".to_string()),
        })
    }
}

/// Everything a terminal wires together, over one fake backend
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub store: LocalStore,
    pub register: Register,
    pub session: SessionContext,
    pub cash: CashCheckout,
    pub hold: HoldOrchestrator,
    pub gcash: GcashCheckout,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_gcash(GcashConfig {
            poll_interval: POLL,
            session_timeout: None,
        })
    }

    pub fn with_gcash(config: GcashConfig) -> Self {
        Self::with_store(config, LocalStore::open_in_memory().unwrap())
    }

    pub fn with_store(config: GcashConfig, store: LocalStore) -> Self {
        let backend = FakeBackend::new();
        let register = Register::new(PricingEngine::default());
        let cash = CashCheckout::new(backend.clone(), store.clone(), register.clone());
        let hold = HoldOrchestrator::new(backend.clone(), store.clone(), register.clone(), Duration::ZERO);
        let gcash = GcashCheckout::new(backend.clone(), backend.clone(), store.clone(), register.clone(), config);
        Self {
            backend,
            store,
            register,
            session: SessionContext::new(Operator {
                operator_id: Some("op-1".into()),
                branch_id: Some(1),
            }),
            cash,
            hold,
            gcash,
        }
    }

    /// Put `lines` into the cart, one add per unit
    pub fn fill(&self, lines: &[(i64, &str, i64, u32)]) {
        self.register
            .edit(|cart| {
                for &(id, name, price, qty) in lines {
                    for _ in 0..qty {
                        cart.add(CartLine::plain(id, name, Decimal::from(price)));
                    }
                }
            })
            .unwrap();
    }
}

pub fn catalog() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Americano".into(),
            category: "Coffee".into(),
            description: String::new(),
            price: Decimal::from(100),
            availability: "Available".into(),
            sizes: vec![],
        },
        Product {
            id: 2,
            name: "Latte".into(),
            category: "Coffee".into(),
            description: String::new(),
            price: Decimal::from(120),
            availability: "Available".into(),
            sizes: vec![
                SizeOption {
                    id: 21,
                    label: "12oz".into(),
                    price: Decimal::from(140),
                    available: true,
                },
                SizeOption {
                    id: 22,
                    label: "16oz".into(),
                    price: Decimal::from(160),
                    available: true,
                },
            ],
        },
        Product {
            id: 3,
            name: "Croissant".into(),
            category: "Pastry".into(),
            description: String::new(),
            price: Decimal::from(85),
            availability: "Available".into(),
            sizes: vec![],
        },
        Product {
            id: 4,
            name: "Matcha".into(),
            category: "Tea".into(),
            description: String::new(),
            price: Decimal::from(150),
            availability: "Out of stock".into(),
            sizes: vec![],
        },
    ]
}

pub fn product(id: i64) -> Product {
    catalog().into_iter().find(|p| p.id == id).unwrap()
}
