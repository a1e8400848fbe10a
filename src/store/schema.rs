diesel::table! {
    ticks (ts_ms, exchange, symbol) {
        ts_ms -> BigInt,
        exchange -> Text,
        symbol -> Text,
        base -> Text,
        quote -> Text,
        bid -> Double,
        ask -> Double,
        mid -> Double,
        spread_bps -> Double,
    }
}

diesel::table! {
    divergences (id) {
        id -> Nullable<Integer>,
        ts_ms -> BigInt,
        pair -> Text,
        ex_a -> Text,
        ex_b -> Text,
        mid_a -> Double,
        mid_b -> Double,
        div_pct -> Double,
        spread_bps_a -> Double,
        spread_bps_b -> Double,
    }
}

diesel::table! {
    alerts (id) {
        id -> Nullable<Integer>,
        ts_ms -> BigInt,
        kind -> Text,
        severity -> Text,
        message -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(ticks, divergences, alerts);
