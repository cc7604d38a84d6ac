// 💲 Pricing Delta Calculator
//
//   no previous / unchanged:  "$ {actual} ({base})"
//   changed:                  "$ {actual} ({base}) -> Δ {+/-}{diff}"

use crate::entities::Plan;

/// Price string of `current`, with the change against `previous` when it moved
pub fn delta(previous: Option<&Plan>, current: &Plan) -> String {
    price_delta(
        previous.map(|plan| plan.actual_price),
        current.actual_price,
        current.base_price,
    )
}

/// `delta` over bare prices
pub fn price_delta(previous_actual: Option<i64>, actual: i64, base: i64) -> String {
    let price = format!("$ {} ({})", actual, base);
    match previous_actual {
        Some(previous) if previous != actual => {
            let diff = i128::from(actual) - i128::from(previous);
            format!("{} -> Δ {:+}", price, diff)
        }
        _ => price,
    }
}
