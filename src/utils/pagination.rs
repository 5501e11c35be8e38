/// Turns a 1-based `page` and a requested `limit` into the `(skip, limit)`
/// pair handed to the store. `limit` falls back to `max` when it is missing,
/// non-positive or larger than `max`; `page` falls back to 1.
///
/// The skip saturates, so an absurd page number yields an empty page.
pub fn page_window(limit: Option<i64>, page: Option<i64>, max: i64) -> (u64, i64) {
    let limit = match limit {
        Some(limit) if limit > 0 && limit <= max => limit,
        _ => max,
    };
    let page = match page {
        Some(page) if page > 0 => page,
        _ => 1,
    };
    let skip = (page - 1).saturating_mul(limit);
    (skip.unsigned_abs(), limit)
}
