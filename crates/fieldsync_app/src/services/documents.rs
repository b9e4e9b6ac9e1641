use super::int_id;
use crate::error::AppResult;
use crate::model::{DocType, Document};
use crate::schema::DOCUMENTS;
use chrono::NaiveDate;
use fieldsync_core::{RecordId, Store, TypedCollection};

/// Weekly reports and incapacities.
pub struct DocumentService<'s> {
    store: &'s Store,
}

impl<'s> DocumentService<'s> {
    /// Creates the service.
    #[must_use]
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    fn typed(&self) -> TypedCollection<'s, Document> {
        TypedCollection::new(self.store)
    }

    /// Saves a document and returns its id.
    ///
    /// A document with an id overwrites the stored one.
    pub fn save(&self, document: &Document) -> AppResult<i64> {
        document.validate()?;
        let id = self.typed().put(document)?;
        int_id(DOCUMENTS, &id)
    }

    /// Lists documents of one kind, newest start date first.
    pub fn list_by_type(&self, doc_type: DocType) -> AppResult<Vec<Document>> {
        let mut documents: Vec<_> = self
            .typed()
            .all()?
            .into_iter()
            .filter(|d| d.doc_type == doc_type)
            .collect();
        documents.sort_by(|a, b| b.date_start.cmp(&a.date_start));
        Ok(documents)
    }

    /// Returns the incapacities still running on `today`.
    pub fn active_incapacities(&self, today: NaiveDate) -> AppResult<Vec<Document>> {
        Ok(self
            .list_by_type(DocType::Incapacity)?
            .into_iter()
            .filter(|d| d.date_end.is_some_and(|end| end >= today))
            .collect())
    }

    /// Removes a document.
    pub fn remove(&self, id: i64) -> AppResult<()> {
        Ok(self.typed().remove(&RecordId::Int(id))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::schema::app_schema;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn list_by_type_filters_and_orders() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let documents = DocumentService::new(&store);

        documents
            .save(&Document::new(DocType::WeeklyReport, 1, day(3)).described("week 23"))
            .unwrap();
        documents
            .save(&Document::new(DocType::Incapacity, 1, day(1)).until(day(4)))
            .unwrap();
        documents
            .save(&Document::new(DocType::WeeklyReport, 2, day(10)))
            .unwrap();

        let reports = documents.list_by_type(DocType::WeeklyReport).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].date_start, day(10));
    }

    #[test]
    fn active_incapacities_end_today_or_later() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let documents = DocumentService::new(&store);
        documents
            .save(&Document::new(DocType::Incapacity, 1, day(1)).until(day(4)))
            .unwrap();
        let ongoing = documents
            .save(&Document::new(DocType::Incapacity, 2, day(2)).until(day(20)))
            .unwrap();

        let active = documents.active_incapacities(day(5)).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, Some(ongoing));
        assert_eq!(documents.active_incapacities(day(4)).unwrap().len(), 2);
    }

    #[test]
    fn incapacity_needs_end_date() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let documents = DocumentService::new(&store);
        assert!(matches!(
            documents.save(&Document::new(DocType::Incapacity, 1, day(1))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn save_with_id_overwrites() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let documents = DocumentService::new(&store);
        let id = documents
            .save(&Document::new(DocType::WeeklyReport, 1, day(3)))
            .unwrap();
        let mut doc = documents.list_by_type(DocType::WeeklyReport).unwrap().remove(0);
        doc.description = "revised".into();
        assert_eq!(documents.save(&doc).unwrap(), id);

        let all = documents.list_by_type(DocType::WeeklyReport).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, "revised");
        documents.remove(id).unwrap();
        assert!(documents.list_by_type(DocType::WeeklyReport).unwrap().is_empty());
    }
}
