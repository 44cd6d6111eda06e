use negoce_core::currency::{
    format_amount, round_money, round_quantity, round_rate, Currency, RateBook,
};
use negoce_core::errors::CoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn desk_rates() -> RateBook {
    RateBook::new()
        .with_rate(Currency::USD, dec!(8500))
        .with_rate(Currency::EUR, dec!(9200))
        .with_rate(Currency::XOF, dec!(14.5))
}

#[test]
fn conversions_route_through_the_base_currency() {
    let book = desk_rates();
    assert_eq!(
        book.convert(dec!(150), Currency::USD, Currency::GNF).expect("usd"),
        dec!(1275000)
    );
    assert_eq!(
        book.convert(dec!(1275000), Currency::GNF, Currency::USD).expect("gnf"),
        dec!(150)
    );
    assert_eq!(
        book.convert(dec!(100), Currency::EUR, Currency::XOF).expect("eur to xof"),
        dec!(920000) / dec!(14.5)
    );
}

#[test]
fn identity_conversion_never_consults_the_book() {
    let empty = RateBook::new();
    assert_eq!(
        empty.convert(dec!(42), Currency::USD, Currency::USD).expect("identity"),
        dec!(42)
    );
}

#[test]
fn round_trips_are_exact_for_positive_rates() {
    let book = desk_rates();
    for currency in [Currency::USD, Currency::EUR, Currency::XOF] {
        for amount in [dec!(0), dec!(1), dec!(0.0001), dec!(46750000)] {
            let out = book.convert(amount, Currency::GNF, currency).expect("out");
            let back = book.convert(out, currency, Currency::GNF).expect("back");
            assert_eq!(back, amount, "{currency} drifted for {amount}");
        }
    }
}

#[test]
fn consulted_rates_must_be_present_and_positive() {
    let book = RateBook::new().with_rate(Currency::USD, Decimal::ZERO);
    assert!(matches!(
        book.convert(dec!(1), Currency::USD, Currency::GNF),
        Err(CoreError::NonPositiveRate(Currency::USD))
    ));
    assert!(matches!(
        book.convert(dec!(1), Currency::EUR, Currency::GNF),
        Err(CoreError::MissingRate(Currency::EUR))
    ));
    // A rate that is never consulted does not fail the conversion.
    assert_eq!(
        book.convert(dec!(5), Currency::GNF, Currency::GNF).expect("base"),
        dec!(5)
    );
}

#[test]
fn presentation_rounding_is_bankers_at_fixed_scales() {
    assert_eq!(round_money(dec!(1040318.181818)), dec!(1040318.18));
    assert_eq!(round_money(dec!(2.125)), dec!(2.12));
    assert_eq!(round_money(dec!(2.135)), dec!(2.14));
    assert_eq!(round_quantity(dec!(14.50004999)), dec!(14.5000));
    assert_eq!(round_rate(dec!(0.123456785)), dec!(0.12345678));
}

#[test]
fn amounts_format_with_grouping_for_reports() {
    assert_eq!(format_amount(dec!(46750000), Currency::GNF), "46,750,000 GNF");
    assert_eq!(format_amount(dec!(-1650000.5), Currency::GNF), "-1,650,000.50 GNF");
    assert_eq!(format_amount(dec!(150), Currency::USD), "150 USD");
}
