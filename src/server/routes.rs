use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router
};
use serde::{Serialize, Deserialize};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use banka::{Amount, BarChart, CurrencyPair, Ledger, Transaction, TransactionKind};
use banka::backend::KeyValueStore;
use banka::rates::RateProvider;

use crate::error::ServerError;

/// Shared handler state. The mutex makes every ledger operation
/// run to completion before the next one starts.
pub(crate) struct AppState<S: KeyValueStore> {
    pub ledger: Mutex<Ledger<S>>,
    pub currencies: CurrencyPair,
    pub rates: Box<dyn RateProvider>
}

type SharedState<S> = Arc<AppState<S>>;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AmountRequest {
    pub amount: Amount
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct BalanceResponse {
    pub balance: Amount
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum KindParam {
    Deposit,
    Withdrawal
}

impl From<KindParam> for TransactionKind {
    fn from(kind: KindParam) -> Self {
        match kind {
            KindParam::Deposit => TransactionKind::Deposit,
            KindParam::Withdrawal => TransactionKind::Withdrawal
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryQuery {
    kind: Option<KindParam>,
    #[serde(default)]
    newest_first: bool
}

#[derive(Debug, Serialize)]
pub(crate) struct SummaryResponse {
    balance: Amount,
    deposit_sum: Amount,
    withdrawal_sum: Amount,
    chart: BarChart
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConvertQuery {
    amount: Amount
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ConvertResponse {
    pub amount: Amount,
    pub source: String,
    pub converted: Amount,
    pub target: String
}

pub(crate) fn router<S>(state: AppState<S>) -> Router
where
    S: KeyValueStore + Send + 'static
{
    Router::new()
        .route("/balance", get(balance::<S>))
        .route("/deposit", post(deposit::<S>))
        .route("/withdraw", post(withdraw::<S>))
        .route("/transactions", get(transactions::<S>))
        .route("/summary", get(summary::<S>))
        .route("/convert", get(convert::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn balance<S: KeyValueStore>(State(state): State<SharedState<S>>) -> Json<BalanceResponse> {
    let ledger = state.ledger.lock().await;
    Json(BalanceResponse { balance: ledger.balance() })
}

async fn deposit<S: KeyValueStore>(
    State(state): State<SharedState<S>>,
    Json(req): Json<AmountRequest>
) -> Result<Json<BalanceResponse>, ServerError> {
    let mut ledger = state.ledger.lock().await;
    let balance = ledger.deposit(req.amount)?;
    Ok(Json(BalanceResponse { balance }))
}

async fn withdraw<S: KeyValueStore>(
    State(state): State<SharedState<S>>,
    Json(req): Json<AmountRequest>
) -> Result<Json<BalanceResponse>, ServerError> {
    let mut ledger = state.ledger.lock().await;
    let balance = ledger.withdraw(req.amount)?;
    Ok(Json(BalanceResponse { balance }))
}

async fn transactions<S: KeyValueStore>(
    State(state): State<SharedState<S>>,
    Query(query): Query<HistoryQuery>
) -> Json<Vec<Transaction>> {
    let ledger = state.ledger.lock().await;
    let mut list: Vec<Transaction> = match query.kind {
        Some(kind) => ledger.transactions_of(kind.into()).into_iter().cloned().collect(),
        None => ledger.transactions().to_vec()
    };
    if query.newest_first {
        list.reverse();
    }
    Json(list)
}

async fn summary<S: KeyValueStore>(State(state): State<SharedState<S>>) -> Json<SummaryResponse> {
    let ledger = state.ledger.lock().await;
    Json(SummaryResponse {
        balance: ledger.balance(),
        deposit_sum: ledger.deposit_sum(),
        withdrawal_sum: ledger.withdrawal_sum(),
        chart: ledger.chart()
    })
}

// never takes the ledger lock
async fn convert<S: KeyValueStore>(
    State(state): State<SharedState<S>>,
    Query(query): Query<ConvertQuery>
) -> Result<Json<ConvertResponse>, ServerError> {
    let amount = banka::transaction::validate_amount(query.amount)?;
    let pair = &state.currencies;

    match banka::convert(amount, pair, state.rates.as_ref()).await {
        Some(converted) => Ok(Json(ConvertResponse {
            amount,
            source: pair.source.clone(),
            converted,
            target: pair.target.clone()
        })),
        None => Err(ServerError::Unavailable("exchange rate lookup failed".to_owned()))
    }
}


#[cfg(test)]
mod tests {
    use super::{router, AppState, BalanceResponse, ConvertResponse};

    use async_trait::async_trait;
    use axum::{body::Body, http::{Request, StatusCode}, Router};
    use banka::{CurrencyPair, Ledger, SystemClock, Transaction, TransactionKind};
    use banka::backend::MemoryStore;
    use banka::rates::{FixedRate, RateError, RateProvider};
    use rstest::{fixture, rstest};
    use serde::de::DeserializeOwned;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    struct FailingRates;

    #[async_trait]
    impl RateProvider for FailingRates {
        async fn rate(&self, _source: &str, _target: &str) -> Result<f64, RateError> {
            Err(RateError::Network("timed out".to_string()))
        }
    }

    fn app_with(rates: Box<dyn RateProvider>) -> Router {
        router(AppState {
            ledger: Mutex::new(Ledger::load(MemoryStore::new(), SystemClock, 500.0)),
            currencies: CurrencyPair::default(),
            rates
        })
    }

    #[fixture]
    fn app() -> Router {
        app_with(Box::new(FixedRate(1.03)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_amount(uri: &str, amount: f64) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "amount": amount }).to_string()))
            .unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn deposit_then_balance(app: Router) {
        let (status, body) = send(&app, post_amount("/deposit", 100.0)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<BalanceResponse>(&body).balance, 600.0);

        let (_, body) = send(&app, get("/balance")).await;
        assert_eq!(parse::<BalanceResponse>(&body).balance, 600.0);
    }

    #[rstest]
    #[tokio::test]
    async fn overdraft_is_unprocessable(app: Router) {
        let (status, _) = send(&app, post_amount("/withdraw", 700.0)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, post_amount("/deposit", -3.0)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, body) = send(&app, get("/balance")).await;
        assert_eq!(parse::<BalanceResponse>(&body).balance, 500.0);
    }

    #[rstest]
    #[tokio::test]
    async fn history_filters_and_orders(app: Router) {
        send(&app, post_amount("/deposit", 10.0)).await;
        send(&app, post_amount("/withdraw", 4.0)).await;
        send(&app, post_amount("/deposit", 20.0)).await;

        let (_, body) = send(&app, get("/transactions")).await;
        let all: Vec<Transaction> = parse(&body);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].kind(), TransactionKind::Withdrawal);

        let (_, body) = send(&app, get("/transactions?kind=deposit&newest_first=true")).await;
        let deposits: Vec<Transaction> = parse(&body);
        let amounts: Vec<f64> = deposits.iter().map(|t| t.amount()).collect();
        assert_eq!(amounts, vec![20.0, 10.0]);
    }

    #[rstest]
    #[tokio::test]
    async fn summary_has_chart(app: Router) {
        send(&app, post_amount("/deposit", 80.0)).await;
        send(&app, post_amount("/withdraw", 20.0)).await;

        let (status, body) = send(&app, get("/summary")).await;
        assert_eq!(status, StatusCode::OK);

        let summary: serde_json::Value = parse(&body);
        assert_eq!(summary["balance"], 560.0);
        assert_eq!(summary["deposit_sum"], 80.0);
        assert_eq!(summary["withdrawal_sum"], 20.0);
        assert_eq!(summary["chart"]["bars"][1]["fraction"], 0.25);
    }

    #[rstest]
    #[tokio::test]
    async fn convert_uses_rate(app: Router) {
        let (status, body) = send(&app, get("/convert?amount=100")).await;
        assert_eq!(status, StatusCode::OK);

        let converted: ConvertResponse = parse(&body);
        assert!((converted.converted - 103.0).abs() < 1e-9);
        assert_eq!(converted.source, "EUR");
        assert_eq!(converted.target, "USD");
    }

    #[tokio::test]
    async fn convert_failure_is_unavailable() {
        let app = app_with(Box::new(FailingRates));
        let (status, _) = send(&app, get("/convert?amount=100")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
