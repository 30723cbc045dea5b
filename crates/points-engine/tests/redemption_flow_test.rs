//! 权益兑换流程测试（内存账本）

use std::sync::Arc;

use ecosrev_points::ledger::{Fault, InMemoryLedger, LedgerOperation};
use ecosrev_points::{
    Benefit, Credential, MemorySession, PointsEngine, PointsError, RedemptionStage, RetrySafety,
    TransactionKind,
};

fn setup(balance: u64, catalog: &[Benefit]) -> (Arc<InMemoryLedger>, PointsEngine) {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.set_balance("user-1", balance);
    for benefit in catalog {
        ledger.upsert_benefit(benefit.clone());
    }
    let session = Arc::new(MemorySession::with_credential(Credential::new(
        "token", "user-1",
    )));
    let engine = PointsEngine::new(ledger.clone(), session);
    (ledger, engine)
}

fn catalog() -> Vec<Benefit> {
    vec![
        Benefit::new("B1", "Cupom feira", 40, 3).with_address("Rua A, 10"),
        Benefit::new("B2", "Sacola retornável", 15, 5),
    ]
}

#[tokio::test]
async fn test_redeem_lowers_balance_and_quantity() {
    let (ledger, engine) = setup(100, &catalog());
    engine.refresh().await.unwrap();

    let selection = engine.select_benefit("B1").unwrap().confirm();
    let receipt = engine.redeem(&selection).await.unwrap();

    assert!(receipt.is_complete());
    assert_eq!(receipt.new_balance, 60);
    assert_eq!(ledger.balance("user-1"), Some(60));
    assert_eq!(ledger.benefit("B1").unwrap().available_quantity, 2);
    // 其他权益不受影响
    assert_eq!(ledger.benefit("B2").unwrap().available_quantity, 5);

    assert_eq!(engine.cache().points(), Some(60));
    assert_eq!(engine.cache().find_benefit("B1").unwrap().available_quantity, 2);

    let transactions = ledger.transactions();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].kind, TransactionKind::Redemption);
    assert_eq!(transactions[0].delta, -40);
}

#[tokio::test]
async fn test_insufficient_points_writes_nothing() {
    let (ledger, engine) = setup(5, &[Benefit::new("B1", "Cupom", 50, 1)]);
    engine.refresh().await.unwrap();

    let selection = engine.select_benefit("B1").unwrap().confirm();
    let err = engine.redeem(&selection).await.unwrap_err();

    assert!(matches!(err, PointsError::InsufficientPoints { .. }));
    assert_eq!(ledger.balance("user-1"), Some(5));
    assert_eq!(ledger.write_counts().total(), 0);
}

#[tokio::test]
async fn test_last_unit_disappears_from_catalog() {
    let (ledger, engine) = setup(100, &[Benefit::new("B1", "Cupom", 40, 1)]);
    engine.refresh().await.unwrap();

    let selection = engine.select_benefit("B1").unwrap().confirm();
    engine.redeem(&selection).await.unwrap();

    assert_eq!(ledger.benefit("B1").unwrap().available_quantity, 0);
    assert!(engine.cache().find_benefit("B1").is_none());
    assert!(matches!(
        engine.select_benefit("B1"),
        Err(PointsError::BenefitUnavailable(_))
    ));
}

#[tokio::test]
async fn test_debit_failure_changes_nothing() {
    let (ledger, engine) = setup(100, &catalog());
    engine.refresh().await.unwrap();
    ledger.fail_next(LedgerOperation::WriteBalance, Fault::Rejected);

    let selection = engine.select_benefit("B1").unwrap().confirm();
    let err = engine.redeem(&selection).await.unwrap_err();

    assert!(matches!(err, PointsError::RedemptionFailed { .. }));
    assert_eq!(err.retry_safety(), RetrySafety::Safe);
    assert_eq!(ledger.balance("user-1"), Some(100));
    assert_eq!(ledger.benefit("B1").unwrap().available_quantity, 3);
    assert_eq!(engine.cache().points(), Some(100));
    assert_eq!(ledger.write_counts().quantity, 0);

    // 重试成功
    let receipt = engine.redeem(&selection).await.unwrap();
    assert_eq!(receipt.new_balance, 60);
}

#[tokio::test]
async fn test_inventory_failure_after_debit_is_partial() {
    let (ledger, engine) = setup(100, &catalog());
    engine.refresh().await.unwrap();
    ledger.fail_next(LedgerOperation::WriteQuantity, Fault::Timeout);

    let selection = engine.select_benefit("B1").unwrap().confirm();
    let receipt = engine.redeem(&selection).await.unwrap();

    assert_eq!(receipt.final_stage, RedemptionStage::DecrementFailed);
    let warning = receipt.warning.expect("partial redemption warning");
    assert!(warning.outcome_unknown);

    // 余额已扣减，库存未变，也不会被二次扣减
    assert_eq!(receipt.new_balance, 60);
    assert_eq!(ledger.balance("user-1"), Some(60));
    assert_eq!(ledger.benefit("B1").unwrap().available_quantity, 3);

    let snapshot = engine.refresh().await.unwrap();
    assert_eq!(snapshot.points, Some(60));
    assert_eq!(snapshot.find_benefit("B1").unwrap().available_quantity, 3);
    assert_eq!(ledger.write_counts().quantity, 1);
}

#[tokio::test]
async fn test_catalog_refetch_failure_does_not_fail_redemption() {
    let (ledger, engine) = setup(100, &catalog());
    engine.refresh().await.unwrap();
    ledger.fail_next(LedgerOperation::ReadCatalog, Fault::Rejected);

    let selection = engine.select_benefit("B1").unwrap().confirm();
    let receipt = engine.redeem(&selection).await.unwrap();

    assert!(receipt.is_complete());
    // 目录刷新失败时本地仍是旧目录
    assert_eq!(engine.cache().find_benefit("B1").unwrap().available_quantity, 3);
}

#[tokio::test]
async fn test_select_before_refresh_finds_nothing() {
    let (_ledger, engine) = setup(100, &catalog());

    assert!(matches!(
        engine.select_benefit("B1"),
        Err(PointsError::BenefitUnavailable(_))
    ));
}

#[tokio::test]
async fn test_reset_clears_local_state() {
    let (_ledger, engine) = setup(100, &catalog());
    engine.refresh().await.unwrap();
    assert!(engine.balance().is_some());

    engine.reset();
    assert!(engine.balance().is_none());
    assert!(engine.cache().benefits().is_empty());
}
