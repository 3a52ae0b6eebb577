use core::cmp::Ordering;

use serde_json::Value;

use super::super::{Attributes, ListQuery, Listed, Order, RepositoryError, Result as RepoResult};

pub fn find_mut<T, P>(v: &mut [T], preficate: P) -> RepoResult<&mut T>
where
    T: ::core::fmt::Debug,
    P: FnMut(&&mut T) -> bool,
{
    let mut res = v.iter_mut().filter(preficate).collect::<Vec<_>>();

    tracing::trace!("found - {:?}", res);

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

pub fn find_ref<T, P>(v: &[T], preficate: P) -> RepoResult<&T>
where
    T: ::core::fmt::Debug,
    P: FnMut(&&T) -> bool,
{
    let mut res = v.iter().filter(preficate).collect::<Vec<_>>();

    tracing::trace!("found - {:?}", res);

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

/// filter, sort and slice the way the document store does.
pub fn apply_list<T>(v: &[T], query: &ListQuery) -> Listed<T>
where T: Attributes + Clone {
    let ListQuery {
        filters,
        order,
        limit,
        offset,
    } = query;

    let mut matched = v
        .iter()
        .filter(|item| filters.iter().all(|f| f.matches(*item)))
        .cloned()
        .collect::<Vec<_>>();

    matched.sort_by(|a, b| {
        order
            .iter()
            .map(|o| match o {
                Order::Asc(name) => compare(a.attribute(name), b.attribute(name)),
                Order::Desc(name) => compare(b.attribute(name), a.attribute(name)),
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let total = matched.len() as u64;
    let items = matched
        .into_iter()
        .skip(offset.unwrap_or(0) as usize)
        .take(limit.map(|n| n as usize).unwrap_or(usize::MAX))
        .collect();

    Listed { items, total }
}

fn compare(a: Option<Value>, b: Option<Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(&b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
