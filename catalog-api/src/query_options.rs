use crate::config::ApiConfig;
use crate::handlers::DocumentQuery;
use crate::store::{FindOptions, SortDirection, SortKey};

/// Translates the paging, sorting and projection parameters of a request
/// into store options. Unusable values fall back to defaults, never errors.
pub fn find_options(params: &DocumentQuery, config: &ApiConfig) -> FindOptions {
    let take = parse_take(params.take.as_deref(), config.results_limit);
    let page = parse_page(params.page.as_deref());

    FindOptions {
        limit: Some(take),
        skip: (page - 1).saturating_mul(take),
        sort: sort_keys(
            params.sort_field.as_deref(),
            params.sort_dir.as_deref(),
            &config.default_sort_field,
        ),
        exclude: config.private_fields.clone(),
    }
}

fn parse_take(take: Option<&str>, results_limit: usize) -> usize {
    match take.and_then(|t| t.trim().parse::<usize>().ok()) {
        Some(take) if take >= 1 && take <= results_limit => take,
        _ => results_limit,
    }
}

fn parse_page(page: Option<&str>) -> usize {
    match page.and_then(|p| p.trim().parse::<usize>().ok()) {
        Some(page) if page >= 1 => page,
        _ => 1,
    }
}

fn sort_keys(
    sort_field: Option<&str>,
    sort_dir: Option<&str>,
    default_field: &str,
) -> Vec<SortKey> {
    let direction = match sort_dir {
        Some("desc") => SortDirection::Descending,
        _ => SortDirection::Ascending,
    };

    match sort_field.filter(|f| !f.is_empty()) {
        Some(field) if field == default_field => vec![SortKey::new(field, direction)],
        Some(field) => vec![
            SortKey::new(field, direction),
            SortKey::new(default_field, SortDirection::Ascending),
        ],
        None => vec![SortKey::new(default_field, direction)],
    }
}
