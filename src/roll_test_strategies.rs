use proptest::prelude::*;
use crate::{Dice, DicePart, DropKeep, Manipulation, Sign, Threshold};


pub(crate) fn drop_keep_strategy(max_n: u16) -> impl Strategy<Value = DropKeep> {
    (1u16..=max_n.max(1), 0u8..4).prop_map(|(n, kind)| {
        match kind {
            0 => DropKeep::kh(n),
            1 => DropKeep::kl(n),
            2 => DropKeep::dh(n),
            _ => DropKeep::dl(n),
        }
    })
}

pub(crate) fn threshold_strategy(sides: u16) -> impl Strategy<Value = Threshold> {
    (1u16..=sides, any::<bool>()).prop_map(|(n, floor)| {
        if floor { Threshold::Floor(n) } else { Threshold::Ceiling(n) }
    })
}

fn manipulation_strategy(count: u16, sides: u16) -> impl Strategy<Value = Manipulation> {
    prop_oneof![
        drop_keep_strategy(count).prop_map(Manipulation::DropKeep),
        threshold_strategy(sides).prop_map(Manipulation::Threshold),
    ]
}

/// Parts with dice or a flat modifier. Explosions are left out so totals stay
/// inside [`DicePart::min`] and [`DicePart::max`].
pub(crate) fn dice_part_strategy() -> impl Strategy<Value = DicePart> {
    let die = (1..=20u16, 1..=100u16)
        .prop_flat_map(|(count, sides)| (
            Just(count),
            Just(sides),
            prop::collection::vec(1..=sides, 0..=count as usize),
            prop::collection::vec(manipulation_strategy(count, sides), 0..3),
            prop::option::of(prop_oneof![Just(Sign::Plus), Just(Sign::Minus)]),
            -10..=10i32,
        ))
        .prop_map(|(count, sides, fixed, manipulations, sign, modifier)| {
            let mut builder = DicePart::builder().dice(count, sides).fixed_rolls(fixed).modifier(modifier);
            if let Some(sign) = sign {
                builder = builder.sign(sign);
            }

            manipulations.into_iter()
                .fold(builder, |builder, manipulation| builder.manipulation(manipulation))
                .build()
                .unwrap()
        });

    let flat = (-100..=100i32, "[a-z]{0,8}")
        .prop_map(|(modifier, description)| {
            DicePart::builder().modifier(modifier).description(&description).build().unwrap()
        });

    prop_oneof![3 => die, 1 => flat]
}

pub(crate) fn dice_strategy() -> impl Strategy<Value = Dice> {
    prop::collection::vec(dice_part_strategy(), 1..5).prop_map(Dice::new)
}
