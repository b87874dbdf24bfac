use gemrbi::capabilities::default_gated_generics;
use gemrbi::{
    Capability, CapabilityRegistry, CapabilityRule, CapabilitySet, TypeNode, TypeSerializer,
    VersionIdentifier,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn arb_version() -> impl Strategy<Value = VersionIdentifier> {
    (0u64..=2, 0u64..=6, 10500u64..=10900).prop_map(|(major, minor, patch)| {
        format!("{}.{}.{}", major, minor, patch)
            .parse::<VersionIdentifier>()
            .unwrap()
    })
}

fn arb_capability() -> impl Strategy<Value = Capability> {
    prop::sample::select(Capability::ALL.to_vec())
}

fn arb_capability_set() -> impl Strategy<Value = CapabilitySet> {
    prop::collection::vec(arb_capability(), 0..=3).prop_map(|caps| caps.into_iter().collect())
}

/// Registries whose rules are never revoked.
fn arb_introduction_only_registry() -> impl Strategy<Value = CapabilityRegistry> {
    prop::collection::vec((arb_capability(), arb_version()), 0..=5).prop_map(|rules| {
        CapabilityRegistry::new(
            rules
                .into_iter()
                .map(|(capability, version)| CapabilityRule::introduced(capability, version))
                .collect(),
            default_gated_generics(),
        )
    })
}

fn arb_type_node() -> impl Strategy<Value = TypeNode> {
    let leaf = prop_oneof![
        Just(TypeNode::Unknown),
        Just(TypeNode::Anything),
        Just(TypeNode::simple("Integer")),
        Just(TypeNode::simple("String")),
        Just(TypeNode::simple("NilClass")),
        Just(TypeNode::class_type("String")),
        Just(TypeNode::class_type("Foo::Bar")),
    ];

    leaf.prop_recursive(
        3,  // depth
        32, // max size
        4,  // items per collection
        |inner| {
            prop_oneof![
                // Generics and unions stay non-empty so every node is valid
                prop::collection::vec(inner.clone(), 1..=2)
                    .prop_map(|args| TypeNode::generic("ObjectSpace::WeakMap", args)),
                prop::collection::vec(inner.clone(), 1..=2)
                    .prop_map(|args| TypeNode::generic("T::Array", args)),
                prop::collection::vec(inner.clone(), 1..=4).prop_map(TypeNode::union),
                inner.prop_map(TypeNode::alias),
            ]
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        // Do not write `.proptest-regressions` files into the repo.
        failure_persistence: None,
        .. ProptestConfig::default()
    })]
    #[test]
    fn prop_capabilities_grow_with_version(
        registry in arb_introduction_only_registry(),
        a in arb_version(),
        b in arb_version(),
    ) {
        prop_assert!(registry.is_monotonic());
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(registry
            .capabilities_for(&low)
            .is_subset(&registry.capabilities_for(&high)));
    }

    #[test]
    fn prop_version_order_is_total(a in arb_version(), b in arb_version()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a == b, a.as_str() == b.as_str());
    }

    #[test]
    fn prop_union_equivalent_under_permutation(
        members in prop::collection::vec(arb_type_node(), 1..=5),
        rotation in 0usize..5,
    ) {
        let mut rotated = members.clone();
        let len = rotated.len();
        rotated.rotate_left(rotation % len);
        prop_assert!(TypeNode::union(members).equivalent(&TypeNode::union(rotated)));
    }

    #[test]
    fn prop_normalize_is_idempotent(node in arb_type_node()) {
        let once = node.normalize();
        prop_assert_eq!(once.normalize(), once);
    }

    #[test]
    fn prop_normalize_preserves_equivalence_of_unions(
        members in prop::collection::vec(arb_type_node(), 2..=4),
    ) {
        let node = TypeNode::union(members.clone());
        let mut doubled = members.clone();
        doubled.extend(members);
        prop_assert_eq!(TypeNode::union(doubled).normalize(), node.normalize());
    }

    #[test]
    fn prop_render_is_total_and_deterministic(
        node in arb_type_node(),
        caps in arb_capability_set(),
    ) {
        let registry = CapabilityRegistry::default();
        let serializer = TypeSerializer::new(&caps, &registry);
        let first = serializer.render("Foo", &node);
        prop_assert!(first.is_ok());
        prop_assert_eq!(first, serializer.render("Foo", &node));
    }

    #[test]
    fn prop_class_reference_unions_collapse_without_capability(
        members in prop::collection::vec(arb_type_node(), 2..=4),
    ) {
        let union = TypeNode::union(members);
        let normalized = union.normalize();
        prop_assume!(
            matches!(normalized, TypeNode::Union { .. }) && normalized.contains_class_type()
        );

        let registry = CapabilityRegistry::default();
        let caps = CapabilitySet::empty();
        let rendered = TypeSerializer::new(&caps, &registry).render("Foo", &union).unwrap();
        prop_assert_eq!(rendered, "T.untyped");
    }
}
