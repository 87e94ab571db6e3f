//! The memory and SQLite backends must agree on every attribute operation.

use proptest::prelude::*;

use maestro_core::UserId;
use maestro_store::{AddResult, AttributeStore, MemoryStore, SqliteStore, UpdateResult};

const NAME: &str = "bh_maestro_key";

#[derive(Debug, Clone)]
enum AttrOp {
    Get(u64),
    Add { user: u64, value: String, unique: bool },
    Update { user: u64, value: String, expected: Option<String> },
    Delete(u64),
}

/// Result of one operation, without backend-assigned row ids.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Value(Option<String>),
    Added(bool),
    Updated(UpdateResult),
    Deleted(bool),
}

fn value() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", "ABC123", "XYZ789"]).prop_map(String::from)
}

fn attr_op() -> impl Strategy<Value = AttrOp> {
    let user = 1u64..=2;
    prop_oneof![
        user.clone().prop_map(AttrOp::Get),
        (user.clone(), value(), any::<bool>())
            .prop_map(|(user, value, unique)| AttrOp::Add { user, value, unique }),
        (user.clone(), value(), prop::option::of(value()))
            .prop_map(|(user, value, expected)| AttrOp::Update { user, value, expected }),
        user.prop_map(AttrOp::Delete),
    ]
}

async fn run<S: AttributeStore>(store: &S, op: &AttrOp) -> Outcome {
    match op {
        AttrOp::Get(user) => Outcome::Value(store.get_attribute(UserId(*user), NAME).await.unwrap()),
        AttrOp::Add { user, value, unique } => {
            let added = store
                .add_attribute(UserId(*user), NAME, value, *unique)
                .await
                .unwrap();
            Outcome::Added(matches!(added, AddResult::Added(_)))
        }
        AttrOp::Update { user, value, expected } => Outcome::Updated(
            store
                .update_attribute(UserId(*user), NAME, value, expected.as_deref())
                .await
                .unwrap(),
        ),
        AttrOp::Delete(user) => {
            Outcome::Deleted(store.delete_attribute(UserId(*user), NAME).await.unwrap())
        }
    }
}

proptest! {
    #[test]
    fn test_backends_agree(ops in prop::collection::vec(attr_op(), 0..40)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let memory = MemoryStore::new();
            let sqlite = SqliteStore::open_memory().unwrap();

            for op in &ops {
                let expected = run(&memory, op).await;
                let actual = run(&sqlite, op).await;
                prop_assert_eq!(actual, expected, "op {:?}", op);
            }

            for user in 1..=2 {
                prop_assert_eq!(
                    sqlite.get_attribute(UserId(user), NAME).await.unwrap(),
                    memory.get_attribute(UserId(user), NAME).await.unwrap()
                );
            }
            Ok(())
        })?;
    }
}
