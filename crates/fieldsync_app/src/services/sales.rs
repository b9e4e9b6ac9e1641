use super::int_id;
use crate::error::{AppError, AppResult};
use crate::model::{Promoter, Sale};
use crate::schema::{PROMOTERS, SALES};
use fieldsync_core::{RecordId, Store, TypedCollection};

/// Recorded sales.
pub struct SaleService<'s> {
    store: &'s Store,
}

impl<'s> SaleService<'s> {
    /// Creates the service.
    #[must_use]
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    fn typed(&self) -> TypedCollection<'s, Sale> {
        TypedCollection::new(self.store)
    }

    /// Records a sale and returns its id.
    pub fn record(&self, sale: &Sale) -> AppResult<i64> {
        sale.validate()?;
        if let Some(promoter) = sale.promoter_id {
            if TypedCollection::<Promoter>::new(self.store)
                .get(&RecordId::Int(promoter))?
                .is_none()
            {
                return Err(AppError::not_found(PROMOTERS, promoter));
            }
        }
        let fresh = Sale {
            id: None,
            ..sale.clone()
        };
        let id = self.typed().put(&fresh)?;
        int_id(SALES, &id)
    }

    /// Lists every sale ordered by id.
    pub fn list(&self) -> AppResult<Vec<Sale>> {
        Ok(self.typed().all()?)
    }

    /// Removes a sale.
    pub fn remove(&self, id: i64) -> AppResult<()> {
        Ok(self.typed().remove(&RecordId::Int(id))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::app_schema;
    use crate::services::PromoterService;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn record_and_remove() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let sales = SaleService::new(&store);

        let id = sales.record(&Sale::new(day(), "Centro", "Plan A", 2)).unwrap();
        assert_eq!(sales.list().unwrap()[0].quantity, 2);
        sales.remove(id).unwrap();
        assert!(sales.list().unwrap().is_empty());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let sales = SaleService::new(&store);
        assert!(matches!(
            sales.record(&Sale::new(day(), "Centro", "Plan A", 0)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn seller_must_exist() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let sales = SaleService::new(&store);
        assert!(matches!(
            sales.record(&Sale::new(day(), "Centro", "Plan A", 1).by(8)),
            Err(AppError::NotFound { .. })
        ));

        let ana = PromoterService::new(&store)
            .add(&Promoter::new("Ana", "Centro"))
            .unwrap();
        sales.record(&Sale::new(day(), "Centro", "Plan A", 1).by(ana)).unwrap();
        assert_eq!(sales.list().unwrap()[0].promoter_id, Some(ana));
    }
}
