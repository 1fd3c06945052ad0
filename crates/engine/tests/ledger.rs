use std::collections::HashSet;

use migration::MigratorTrait;
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    CreateExpenseCmd, Engine, EngineError, GroupStanding, MemberAdd, MoneyCents, SplitInput,
    SplitType,
};

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn member(name: &str, email: &str) -> MemberAdd {
    MemberAdd {
        email: email.to_string(),
        name: name.to_string(),
    }
}

/// Creates a group with the given members, returning `(group_id, member_ids)`
/// in input order.
async fn group_with_members(engine: &Engine, members: &[(&str, &str)]) -> (Uuid, Vec<Uuid>) {
    let group = engine.create_group("Trip", None).await.unwrap();
    let adds: Vec<MemberAdd> = members
        .iter()
        .map(|(name, email)| member(name, email))
        .collect();
    let added = engine.add_members(group.id, &adds).await.unwrap();
    assert_eq!(added.added.len(), members.len());
    (group.id, added.added.iter().map(|m| m.member_id).collect())
}

fn equal_inputs(members: &[Uuid]) -> Vec<SplitInput> {
    members
        .iter()
        .map(|member_id| SplitInput {
            member_id: *member_id,
            amount: None,
            percent_bp: None,
        })
        .collect()
}

fn exact_input(member_id: Uuid, cents: i64) -> SplitInput {
    SplitInput {
        member_id,
        amount: Some(MoneyCents::new(cents)),
        percent_bp: None,
    }
}

async fn create_equal_expense(
    engine: &Engine,
    group_id: Uuid,
    paid_by: Uuid,
    amount: i64,
    members: &[Uuid],
) -> engine::ExpenseCreated {
    engine
        .create_expense(CreateExpenseCmd {
            group_id,
            description: "Dinner".to_string(),
            amount: MoneyCents::new(amount),
            paid_by,
            split_type: SplitType::Equal,
            splits: equal_inputs(members),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn add_members_is_idempotent_per_user() {
    let engine = engine_with_db().await;
    let (group_id, members) =
        group_with_members(&engine, &[("Alice", "alice@example.com"), ("Bob", "bob@example.com")])
            .await;
    assert_eq!(members.len(), 2);

    // Same email again: the user is reused and the existing membership is
    // kept, so nothing new is added.
    let again = engine
        .add_members(group_id, &[member("Alice Smith", "alice@example.com")])
        .await
        .unwrap();
    assert!(again.added.is_empty());

    let listed = engine.list_members(group_id).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn duplicate_display_name_is_a_conflict() {
    let engine = engine_with_db().await;
    let (group_id, _) =
        group_with_members(&engine, &[("Alice", "alice@example.com")]).await;

    let err = engine
        .add_members(group_id, &[member("alice", "other@example.com")])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn email_reuse_across_groups_shares_the_user() {
    let engine = engine_with_db().await;
    let (first, _) = group_with_members(&engine, &[("Alice", "alice@example.com")]).await;
    let second = engine.create_group("Flat", None).await.unwrap();

    let added = engine
        .add_members(second.id, &[member("Alice", "alice@example.com")])
        .await
        .unwrap();
    assert_eq!(added.added.len(), 1);

    let first_members = engine.list_members(first).await.unwrap();
    let second_members = engine.list_members(second.id).await.unwrap();
    assert_eq!(first_members[0].user_id, second_members[0].user_id);
    assert_ne!(first_members[0].member_id, second_members[0].member_id);
}

#[tokio::test]
async fn equal_split_scenario_settles_to_payer() {
    let engine = engine_with_db().await;
    let (group_id, members) = group_with_members(
        &engine,
        &[
            ("Alice", "alice@example.com"),
            ("Bob", "bob@example.com"),
            ("Carol", "carol@example.com"),
        ],
    )
    .await;
    let (a, b, c) = (members[0], members[1], members[2]);

    let created = create_equal_expense(&engine, group_id, a, 100_00, &members).await;
    let amounts: Vec<i64> = created.splits.iter().map(|s| s.amount.cents()).collect();
    assert_eq!(amounts, vec![33_34, 33_33, 33_33]);

    let balance = engine.group_balance(group_id).await.unwrap();
    let of = |id: Uuid| {
        balance
            .members
            .iter()
            .find(|m| m.member_id == id)
            .unwrap()
            .clone()
    };
    assert_eq!(of(a).total_paid, MoneyCents::new(100_00));
    assert_eq!(of(a).total_owed, MoneyCents::new(33_34));
    assert_eq!(of(a).balance, MoneyCents::new(66_66));
    assert_eq!(of(b).balance, MoneyCents::new(-33_33));
    assert_eq!(of(c).balance, MoneyCents::new(-33_33));

    assert_eq!(balance.transfers.len(), 2);
    let froms: HashSet<Uuid> = balance.transfers.iter().map(|t| t.from.id).collect();
    assert_eq!(froms, HashSet::from([b, c]));
    for transfer in &balance.transfers {
        assert_eq!(transfer.to.id, a);
        assert_eq!(transfer.amount, MoneyCents::new(33_33));
    }
}

#[tokio::test]
async fn exact_split_must_reconcile() {
    let engine = engine_with_db().await;
    let (group_id, members) =
        group_with_members(&engine, &[("Alice", "alice@example.com"), ("Bob", "bob@example.com")])
            .await;

    let err = engine
        .create_expense(CreateExpenseCmd {
            group_id,
            description: "Groceries".to_string(),
            amount: MoneyCents::new(100_00),
            paid_by: members[0],
            split_type: SplitType::Exact,
            splits: vec![exact_input(members[0], 60_00), exact_input(members[1], 30_00)],
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::SplitMismatch {
            expected: 100_00,
            actual: 90_00,
        }
    );

    // Nothing was committed.
    let (expenses, _) = engine.list_expenses_page(group_id, 10, None).await.unwrap();
    assert!(expenses.is_empty());

    let created = engine
        .create_expense(CreateExpenseCmd {
            group_id,
            description: "Groceries".to_string(),
            amount: MoneyCents::new(100_00),
            paid_by: members[0],
            split_type: SplitType::Exact,
            splits: vec![exact_input(members[0], 60_00), exact_input(members[1], 40_00)],
        })
        .await
        .unwrap();
    let amounts: Vec<i64> = created.splits.iter().map(|s| s.amount.cents()).collect();
    assert_eq!(amounts, vec![60_00, 40_00]);
}

#[tokio::test]
async fn percentage_split_records_basis_points() {
    let engine = engine_with_db().await;
    let (group_id, members) = group_with_members(
        &engine,
        &[
            ("Alice", "alice@example.com"),
            ("Bob", "bob@example.com"),
            ("Carol", "carol@example.com"),
        ],
    )
    .await;

    let percent = |member_id: Uuid, bp: i32| SplitInput {
        member_id,
        amount: None,
        percent_bp: Some(bp),
    };

    let err = engine
        .create_expense(CreateExpenseCmd {
            group_id,
            description: "Hotel".to_string(),
            amount: MoneyCents::new(100_00),
            paid_by: members[0],
            split_type: SplitType::Percentage,
            splits: vec![percent(members[0], 50_00), percent(members[1], 40_00)],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SplitMismatch { .. }));

    let created = engine
        .create_expense(CreateExpenseCmd {
            group_id,
            description: "Hotel".to_string(),
            amount: MoneyCents::new(100_00),
            paid_by: members[0],
            split_type: SplitType::Percentage,
            splits: vec![
                percent(members[0], 33_33),
                percent(members[1], 33_33),
                percent(members[2], 33_34),
            ],
        })
        .await
        .unwrap();

    let amounts: Vec<i64> = created.splits.iter().map(|s| s.amount.cents()).collect();
    assert_eq!(amounts, vec![33_33, 33_33, 33_34]);
    assert_eq!(created.splits[0].percent_bp, Some(33_33));

    let detail = engine
        .expense_with_splits(group_id, created.id)
        .await
        .unwrap();
    assert_eq!(detail.splits[2].percent_bp, Some(33_34));
}

#[tokio::test]
async fn settlement_exceeding_balance_is_rejected_and_not_recorded() {
    let engine = engine_with_db().await;
    let (group_id, members) = group_with_members(
        &engine,
        &[
            ("Alice", "alice@example.com"),
            ("Bob", "bob@example.com"),
            ("Carol", "carol@example.com"),
        ],
    )
    .await;
    let (a, b) = (members[0], members[1]);
    create_equal_expense(&engine, group_id, a, 100_00, &members).await;

    let err = engine
        .record_settlement(group_id, b, a, MoneyCents::new(50_00))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::SettlementExceedsBalance {
            requested: MoneyCents::new(50_00),
            available: MoneyCents::new(33_33),
        }
    );

    // The failed settlement left no trace: the same balances come back.
    let balance = engine.group_balance(group_id).await.unwrap();
    let bob = balance.members.iter().find(|m| m.member_id == b).unwrap();
    assert_eq!(bob.balance, MoneyCents::new(-33_33));

    let recorded = engine
        .record_settlement(group_id, b, a, MoneyCents::new(33_33))
        .await
        .unwrap();
    assert_eq!(recorded.amount, MoneyCents::new(33_33));
    assert_eq!(recorded.from.name, "Bob");
    assert_eq!(recorded.to.name, "Alice");
}

#[tokio::test]
async fn settlements_reduce_future_balances() {
    let engine = engine_with_db().await;
    let (group_id, members) = group_with_members(
        &engine,
        &[
            ("Alice", "alice@example.com"),
            ("Bob", "bob@example.com"),
            ("Carol", "carol@example.com"),
        ],
    )
    .await;
    let (a, b) = (members[0], members[1]);
    create_equal_expense(&engine, group_id, a, 100_00, &members).await;

    engine
        .record_settlement(group_id, b, a, MoneyCents::new(33_33))
        .await
        .unwrap();

    let balance = engine.group_balance(group_id).await.unwrap();
    let of = |id: Uuid| {
        balance
            .members
            .iter()
            .find(|m| m.member_id == id)
            .unwrap()
            .clone()
    };
    assert_eq!(of(b).balance, MoneyCents::ZERO);
    assert_eq!(of(a).balance, MoneyCents::new(33_33));
    // Bob no longer appears as a debtor.
    assert!(balance.transfers.iter().all(|t| t.from.id != b));

    // Paying again would overdraw a settled balance.
    let err = engine
        .record_settlement(group_id, b, a, MoneyCents::new(33_33))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SettlementExceedsBalance { .. }));
}

#[tokio::test]
async fn deleting_an_expense_removes_its_splits() {
    let engine = engine_with_db().await;
    let (group_id, members) =
        group_with_members(&engine, &[("Alice", "alice@example.com"), ("Bob", "bob@example.com")])
            .await;
    let (a, b) = (members[0], members[1]);

    let kept = create_equal_expense(&engine, group_id, a, 40_00, &members).await;
    let dropped = create_equal_expense(&engine, group_id, b, 10_00, &members).await;

    engine.delete_expense(group_id, dropped.id).await.unwrap();

    let err = engine
        .expense_with_splits(group_id, dropped.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // Balances only reflect the surviving expense.
    let balance = engine.group_balance(group_id).await.unwrap();
    let alice = balance.members.iter().find(|m| m.member_id == a).unwrap();
    assert_eq!(alice.total_paid, MoneyCents::new(40_00));
    assert_eq!(alice.total_owed, MoneyCents::new(20_00));
    assert_eq!(alice.balance, MoneyCents::new(20_00));

    let (expenses, _) = engine.list_expenses_page(group_id, 10, None).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].id, kept.id);
}

#[tokio::test]
async fn balance_aggregation_is_idempotent() {
    let engine = engine_with_db().await;
    let (group_id, members) =
        group_with_members(&engine, &[("Alice", "alice@example.com"), ("Bob", "bob@example.com")])
            .await;
    create_equal_expense(&engine, group_id, members[0], 99_99, &members).await;

    let first = engine.group_balance(group_id).await.unwrap();
    let second = engine.group_balance(group_id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn user_summary_spans_groups() {
    let engine = engine_with_db().await;
    let (first, first_members) =
        group_with_members(&engine, &[("Alice", "alice@example.com"), ("Bob", "bob@example.com")])
            .await;
    create_equal_expense(&engine, first, first_members[0], 100_00, &first_members).await;

    let second = engine.create_group("Flat", None).await.unwrap();
    let added = engine
        .add_members(
            second.id,
            &[
                member("Alice", "alice@example.com"),
                member("Bob", "bob@example.com"),
            ],
        )
        .await
        .unwrap();
    let second_members: Vec<Uuid> = added.added.iter().map(|m| m.member_id).collect();
    // Bob pays in the second group, so Alice owes there.
    create_equal_expense(&engine, second.id, second_members[1], 60_00, &second_members).await;

    let alice_user = engine
        .list_members(first)
        .await
        .unwrap()
        .into_iter()
        .find(|m| m.name == "Alice")
        .unwrap()
        .user_id;
    let summary = engine.user_summary(alice_user).await.unwrap();

    assert_eq!(summary.name, "Alice");
    assert_eq!(summary.groups.len(), 2);
    let in_first = summary.groups.iter().find(|g| g.group_id == first).unwrap();
    let in_second = summary
        .groups
        .iter()
        .find(|g| g.group_id == second.id)
        .unwrap();
    assert_eq!(in_first.balance, MoneyCents::new(50_00));
    assert_eq!(in_first.standing, GroupStanding::GetsBack);
    assert_eq!(in_second.balance, MoneyCents::new(-30_00));
    assert_eq!(in_second.standing, GroupStanding::Owes);
    assert_eq!(summary.overall_balance, MoneyCents::new(20_00));
}

#[tokio::test]
async fn expense_listing_pages_through_all_rows() {
    let engine = engine_with_db().await;
    let (group_id, members) =
        group_with_members(&engine, &[("Alice", "alice@example.com"), ("Bob", "bob@example.com")])
            .await;

    let mut created = HashSet::new();
    for cents in [10_00, 20_00, 30_00, 40_00, 50_00] {
        let expense = create_equal_expense(&engine, group_id, members[0], cents, &members).await;
        created.insert(expense.id);
    }

    let mut seen = HashSet::new();
    let mut cursor: Option<String> = None;
    loop {
        let (page, next) = engine
            .list_expenses_page(group_id, 2, cursor.as_deref())
            .await
            .unwrap();
        assert!(page.len() <= 2);
        for expense in &page {
            assert!(seen.insert(expense.id), "page overlap on {}", expense.id);
        }
        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(seen, created);
}

#[tokio::test]
async fn group_activity_accumulates_spend() {
    let engine = engine_with_db().await;
    let (group_id, members) =
        group_with_members(&engine, &[("Alice", "alice@example.com"), ("Bob", "bob@example.com")])
            .await;
    create_equal_expense(&engine, group_id, members[0], 30_00, &members).await;
    create_equal_expense(&engine, group_id, members[1], 20_00, &members).await;

    let activity = engine.group_activity(group_id).await.unwrap();

    let alice = activity
        .members
        .iter()
        .find(|m| m.member_id == members[0])
        .unwrap();
    assert_eq!(alice.total_paid, MoneyCents::new(30_00));
    assert_eq!(alice.total_owed, MoneyCents::new(25_00));
    assert_eq!(alice.net, MoneyCents::new(5_00));

    // Both expenses land on the same day, folded into one point.
    assert_eq!(activity.timeline.len(), 1);
    assert_eq!(activity.timeline[0].cumulative, MoneyCents::new(50_00));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let engine = engine_with_db().await;

    let missing = Uuid::new_v4();
    assert!(matches!(
        engine.group_balance(missing).await.unwrap_err(),
        EngineError::NotFound(_)
    ));
    assert!(matches!(
        engine
            .add_members(missing, &[member("Alice", "alice@example.com")])
            .await
            .unwrap_err(),
        EngineError::NotFound(_)
    ));
    assert!(matches!(
        engine.user_summary(missing).await.unwrap_err(),
        EngineError::NotFound(_)
    ));
}

#[tokio::test]
async fn expense_members_must_belong_to_the_group() {
    let engine = engine_with_db().await;
    let (group_id, members) =
        group_with_members(&engine, &[("Alice", "alice@example.com")]).await;
    let (other_group, other_members) =
        group_with_members(&engine, &[("Mallory", "mallory@example.com")]).await;
    assert_ne!(group_id, other_group);

    // Foreign payer.
    let err = engine
        .create_expense(CreateExpenseCmd {
            group_id,
            description: "Taxi".to_string(),
            amount: MoneyCents::new(10_00),
            paid_by: other_members[0],
            split_type: SplitType::Equal,
            splits: equal_inputs(&members),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // Foreign split target.
    let err = engine
        .create_expense(CreateExpenseCmd {
            group_id,
            description: "Taxi".to_string(),
            amount: MoneyCents::new(10_00),
            paid_by: members[0],
            split_type: SplitType::Equal,
            splits: equal_inputs(&other_members),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // Settlements enforce the same membership rule.
    let err = engine
        .record_settlement(group_id, members[0], other_members[0], MoneyCents::new(1_00))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
