use serde::Serialize;

use crate::core::transaction::{Amount, TransactionKind};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    pub label: &'static str,
    pub kind: TransactionKind,
    pub value: Amount,
    /// Height relative to the tallest bar, in `[0, 1]`.
    pub fraction: f64
}

/// Deposits against withdrawals, scaled to the larger of the two.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarChart {
    pub bars: Vec<Bar>
}

impl BarChart {
    pub fn new(deposit_sum: Amount, withdrawal_sum: Amount) -> BarChart {
        let max_value = deposit_sum.max(withdrawal_sum);
        let scale = |value: Amount| if max_value > 0.0 { value / max_value } else { 0.0 };

        let bars = vec![
            Bar { label: "Deposits", kind: TransactionKind::Deposit,
                value: deposit_sum, fraction: scale(deposit_sum) },
            Bar { label: "Withdrawals", kind: TransactionKind::Withdrawal,
                value: withdrawal_sum, fraction: scale(withdrawal_sum) },
        ];
        return BarChart { bars };
    }

    /// Number of cells a bar occupies when drawn `width` cells wide.
    pub fn cells(bar: &Bar, width: usize) -> usize {
        return (bar.fraction * width as f64).round() as usize;
    }
}


#[cfg(test)]
mod tests {
    use super::BarChart;
    use rstest::rstest;

    #[rstest]
    #[case(300.0, 150.0, 1.0, 0.5)]
    #[case(50.0, 200.0, 0.25, 1.0)]
    #[case(0.0, 0.0, 0.0, 0.0)]
    #[case(0.0, 40.0, 0.0, 1.0)]
    fn scales_to_larger_sum(#[case] deposits: f64, #[case] withdrawals: f64,
                            #[case] deposit_fraction: f64, #[case] withdrawal_fraction: f64) {
        let chart = BarChart::new(deposits, withdrawals);
        assert_eq!(chart.bars.len(), 2);
        assert_eq!(chart.bars[0].value, deposits);
        assert_eq!(chart.bars[0].fraction, deposit_fraction);
        assert_eq!(chart.bars[1].value, withdrawals);
        assert_eq!(chart.bars[1].fraction, withdrawal_fraction);
    }

    #[test]
    fn cells_round_to_width() {
        let chart = BarChart::new(300.0, 100.0);
        assert_eq!(BarChart::cells(&chart.bars[0], 30), 30);
        assert_eq!(BarChart::cells(&chart.bars[1], 30), 10);
    }
}
