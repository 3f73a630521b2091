//! Property-based tests for the plan walker
//!
//! Plans are generated over a small universe of context names and literal
//! program addresses, then resolved against an in-memory account source.
//! The properties hold for every plan shape:
//! 1. The output never contains duplicate addresses
//! 2. Context-bound addresses never appear in the output
//! 3. Appending nodes to a plan never reorders what was already resolved
//! 4. A writable flag, once set, survives any appended nodes

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use proptest::prelude::*;
use solana_sdk::pubkey::Pubkey;

use cpires::plan::{AccountField, AccountRef, Condition, ConditionKey, Discriminant, PlanNode};
use cpires::{AccountFetcher, AccountSnapshot, Context, ResolvedAccounts, Resolver};

const NAMES: [&str; 4] = ["mint", "owner", "to", "authority"];
const LITERALS: [&str; 3] = [
    "BPFLoader2111111111111111111111111111111111",
    "BPFLoaderUpgradeab1e11111111111111111111111",
    "11111111111111111111111111111111",
];

struct MemoryFetcher(HashMap<Pubkey, AccountSnapshot>);

#[async_trait]
impl AccountFetcher for MemoryFetcher {
    async fn fetch(&self, address: &Pubkey) -> cpires::Result<Option<AccountSnapshot>> {
        Ok(self.0.get(address).cloned())
    }
}

/// Bind every universe name to a fresh address and give each one an
/// account owned by one of the literal program addresses.
fn universe(owner_shift: usize) -> (Context, HashMap<Pubkey, AccountSnapshot>) {
    let programs: Vec<Pubkey> = LITERALS.iter().map(|s| s.parse().unwrap()).collect();

    let mut context = Context::new();
    let mut accounts = HashMap::new();
    for (index, name) in NAMES.iter().enumerate() {
        let address = Pubkey::new_unique();
        context.bind(*name, address);
        accounts.insert(
            address,
            AccountSnapshot {
                owner: programs[(index + owner_shift) % programs.len()],
                data: vec![],
                lamports: 1,
                executable: false,
            },
        );
    }
    (context, accounts)
}

async fn resolve(
    context: &Context,
    accounts: &HashMap<Pubkey, AccountSnapshot>,
    plan: &[PlanNode],
) -> ResolvedAccounts {
    let mut resolver = Resolver::new(MemoryFetcher(accounts.clone()));
    resolver.resolve(context, plan).await.unwrap()
}

fn name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES.to_vec()).prop_map(String::from)
}

fn account_ref_strategy() -> impl Strategy<Value = AccountRef> {
    prop_oneof![
        name_strategy().prop_map(AccountRef::Named),
        (name_strategy(), name_strategy())
            .prop_map(|(mint, owner)| AccountRef::AssociatedToken { mint, owner }),
        name_strategy().prop_map(|account| AccountRef::FieldOf {
            account,
            field: AccountField::Owner,
        }),
    ]
}

fn condition_key_strategy() -> impl Strategy<Value = ConditionKey> {
    prop_oneof![
        prop::sample::select(LITERALS.to_vec())
            .prop_map(|literal| ConditionKey::Literal(literal.to_string())),
        name_strategy().prop_map(|account| ConditionKey::Field {
            account,
            field: AccountField::Owner,
        }),
    ]
}

fn condition_strategy() -> impl Strategy<Value = Condition> {
    let leaf = prop::collection::vec(condition_key_strategy(), 0..3)
        .prop_map(|keys| Condition::Equals { keys });
    leaf.prop_recursive(3, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3)
                .prop_map(|conditions| Condition::And { conditions }),
            prop::collection::vec(inner, 0..3).prop_map(|conditions| Condition::Or { conditions }),
        ]
    })
}

fn plan_node_strategy() -> impl Strategy<Value = PlanNode> {
    let leaf = prop_oneof![
        (
            account_ref_strategy(),
            prop::collection::vec(account_ref_strategy(), 0..4),
        )
            .prop_map(|(program, accounts)| PlanNode::RawInvoke {
                program,
                discriminant: Discriminant::Literal { value: vec![12] },
                accounts,
            }),
        Just(PlanNode::DeclaredInvoke {
            program: "mint".to_string(),
            method: "transfer".to_string(),
            accounts: HashMap::new(),
            arguments: HashMap::new(),
        }),
    ];
    leaf.prop_recursive(3, 12, 4, |inner| {
        (
            condition_strategy(),
            prop::collection::vec(inner.clone(), 0..3),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(condition, true_branch, false_branch)| PlanNode::Conditional {
                condition,
                true_branch,
                false_branch,
            })
    })
}

fn plan_strategy() -> impl Strategy<Value = Vec<PlanNode>> {
    prop::collection::vec(plan_node_strategy(), 0..4)
}

proptest! {
    #[test]
    fn output_has_no_duplicates_and_no_known_keys(
        plan in plan_strategy(),
        owner_shift in 0usize..3,
    ) {
        let (context, accounts) = universe(owner_shift);
        let resolved = tokio_test::block_on(resolve(&context, &accounts, &plan));

        let unique: HashSet<_> = resolved.order.iter().collect();
        prop_assert_eq!(unique.len(), resolved.order.len());

        for meta in &resolved.accounts {
            prop_assert!(!context.contains_address(&meta.pubkey));
        }

        let addresses: Vec<_> = resolved.accounts.iter().map(|meta| meta.pubkey).collect();
        prop_assert_eq!(addresses, resolved.order);
    }

    #[test]
    fn appended_nodes_never_reorder_or_downgrade(
        plan in plan_strategy(),
        extra in plan_node_strategy(),
        owner_shift in 0usize..3,
    ) {
        let (context, accounts) = universe(owner_shift);

        let base = tokio_test::block_on(resolve(&context, &accounts, &plan));

        let mut extended_plan = plan.clone();
        extended_plan.push(extra);
        let extended = tokio_test::block_on(resolve(&context, &accounts, &extended_plan));

        // Everything resolved before keeps its position...
        prop_assert!(extended.order.len() >= base.order.len());
        prop_assert_eq!(&extended.order[..base.order.len()], &base.order[..]);

        // ...and never loses a writable bit.
        for (index, meta) in base.accounts.iter().enumerate() {
            if meta.is_writable {
                prop_assert!(extended.accounts[index].is_writable);
            }
        }
    }
}
