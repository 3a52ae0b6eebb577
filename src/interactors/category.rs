use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::*;
use crate::repositories::{CategoryRepository, ListQuery, Order};
use crate::usecases::category::gets;
use crate::utils::{AlsoChain, LetChain};

pub struct CategoryGetsInteractor {
    pub category_repository: Arc<dyn CategoryRepository + Sync + Send>,
}
#[async_trait]
impl gets::Usecase for CategoryGetsInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: gets::Input) -> Result<gets::Output> {
        tracing::trace!("input - {:?}", data);

        self.category_repository
            .finds(ListQuery::default().order(Order::Asc("name".to_string())))
            .await
            .map_err(category_err_fmt)?
            .items
            .let_(|categories| gets::Output { categories })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::fixture;
    use super::*;

    #[tokio::test]
    async fn categories_come_sorted_by_name() {
        let f = fixture();
        let interactor = CategoryGetsInteractor {
            category_repository: f.categories.clone(),
        };

        let out = gets::Usecase::handle(&interactor, gets::Input {}).await.unwrap();

        assert_eq!(
            out.categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Async", "Rust"]
        );
    }
}
