use proptest::prelude::*;


pub(crate) fn simple_number_strategy() -> impl Strategy<Value = String> {
    (1u16..=1000).prop_map(|n| n.to_string())
}

pub(crate) fn simple_dice_strategy() -> impl Strategy<Value = String> {
    (prop::option::of(1u16..=100), 1u16..=1000)
        .prop_map(|(count, size)| match count {
            Some(count) => format!("{count}d{size}"),
            None => format!("d{size}")
        })
}

pub(crate) fn dice_with_modifier_strategy() -> impl Strategy<Value = String> {
    (
        2u16..=100,
        1u16..=1000,
        prop_oneof!["kh", "kl", "dh", "dl"],
        prop::option::of(1u16..=100)
    ).prop_map(|(count, size, modifier, mod_value)| {
        match mod_value {
            None => format!("{count}d{size}{modifier}"),
            Some(val) => format!("{count}d{size}{modifier}{}", std::cmp::min(count, val))
        }
    })
}

pub(crate) fn description_strategy() -> impl Strategy<Value = String> {
    "(atk|dmg|fire|cold|sneak attack|bless)"
}

pub(crate) fn test_suffix_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![">=", "<=", ">", "<", "=", "vs ", "dc ", "ac "],
        1u16..=30,
        any::<bool>()
    ).prop_map(|(op, target, hidden)| {
        if hidden {
            format!("{op}||{target}||")
        } else {
            format!("{op}{target}")
        }
    })
}

pub(crate) fn signed_strategy(inner: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    (inner, prop_oneof![Just("+"), Just("-")])
        .prop_map(|(expr, sign)| format!("{sign}{expr}"))
}

/// Whole roll expressions: dice and flat modifiers, each optionally
/// described, with an optional trailing test.
pub(crate) fn dice_expression_strategy() -> impl Strategy<Value = String> {
    let die = prop_oneof![simple_dice_strategy(), dice_with_modifier_strategy()];
    let first = (die.clone(), prop::option::of(description_strategy()));
    let rest = prop::collection::vec(
        (
            signed_strategy(prop_oneof![die, simple_number_strategy()]),
            prop::option::of(description_strategy())
        ),
        0..3
    );

    (first, rest, prop::option::of(test_suffix_strategy()))
        .prop_map(|(first, rest, test)| {
            std::iter::once(first)
                .chain(rest)
                .map(|(expr, description)| match description {
                    Some(description) => format!("{expr} {description}"),
                    None => expr
                })
                .chain(test)
                .collect::<Vec<_>>()
                .join(" ")
        })
}
