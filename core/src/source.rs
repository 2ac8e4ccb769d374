//! Backend-neutral storage orchestration.
//!
//! [`SourceBase`] accumulates the criteria of the next operation (a bound
//! model template, a property subset, filters, orders and pagination) and
//! resolves raw property identifiers against the bound model as expressions
//! are added. [`Source`] is the contract concrete backends implement on top
//! of it.

use crate::collection::Collection;
use crate::error::{Result, StrataError};
use crate::expression::{
    Filter, FilterData, Operator, Order, OrderData, OrderMode, Pagination, PaginationData,
};
use crate::field::PropertyRef;
use crate::model::Model;
use crate::value::Value;

/// The shared criteria state of a storage source.
///
/// A freshly constructed base has no model bound; operations that need one
/// fail with `NotConfigured` until [`SourceBase::set_model`] is called.
#[derive(Debug, Clone)]
pub struct SourceBase<M: Model> {
    model: Option<M>,
    properties: Vec<String>,
    filters: Vec<Filter>,
    orders: Vec<Order>,
    pagination: Option<Pagination>,
}

impl<M: Model> Default for SourceBase<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> SourceBase<M> {
    pub fn new() -> Self {
        Self {
            model: None,
            properties: Vec::new(),
            filters: Vec::new(),
            orders: Vec::new(),
            pagination: None,
        }
    }

    /// Bind the model template that criteria resolve against and that loaded
    /// rows are cloned from.
    pub fn set_model(&mut self, model: M) -> &mut Self {
        self.model = Some(model);
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// The bound model template.
    pub fn model(&self) -> Result<&M> {
        self.model
            .as_ref()
            .ok_or_else(|| StrataError::not_configured("no model bound to this source"))
    }

    /// Clear all accumulated criteria, keeping the bound model.
    pub fn reset(&mut self) -> &mut Self {
        self.properties.clear();
        self.filters.clear();
        self.orders.clear();
        self.pagination = None;
        self
    }

    /// Restrict operations to a subset of property identifiers.
    ///
    /// An empty subset means "all properties".
    pub fn set_properties<I, S>(&mut self, properties: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.clear();
        for property in properties {
            self.add_property(property)?;
        }
        Ok(self)
    }

    /// Add one property identifier to the subset. Duplicates are ignored.
    pub fn add_property(&mut self, property: impl Into<String>) -> Result<&mut Self> {
        let property = property.into();
        if property.is_empty() {
            return Err(StrataError::invalid("property can not be empty"));
        }
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
        Ok(self)
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// Add a filter, resolving its property against the bound model.
    pub fn add_filter(&mut self, mut filter: Filter) -> Result<&mut Self> {
        self.resolve_filter(&mut filter)?;
        self.filters.push(filter);
        Ok(self)
    }

    pub fn add_filters<I>(&mut self, filters: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Filter>,
    {
        for filter in filters {
            self.add_filter(filter)?;
        }
        Ok(self)
    }

    /// Replace all filters.
    pub fn set_filters<I>(&mut self, filters: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Filter>,
    {
        self.filters.clear();
        self.add_filters(filters)
    }

    pub fn add_filter_data(&mut self, data: FilterData) -> Result<&mut Self> {
        self.add_filter(Filter::from_data(data)?)
    }

    /// Shorthand for an equality filter on a property identifier.
    pub fn filter(&mut self, property: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.add_filter(Filter::new(property, value)?)
    }

    /// Like [`SourceBase::filter`], with extra construction data applied on
    /// top.
    pub fn filter_with(
        &mut self,
        property: &str,
        value: impl Into<Value>,
        data: FilterData,
    ) -> Result<&mut Self> {
        let mut filter = Filter::new(property, value)?;
        filter.apply_data(data)?;
        self.add_filter(filter)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Add a sort key, resolving its property against the bound model.
    pub fn add_order(&mut self, mut order: Order) -> Result<&mut Self> {
        self.resolve_order(&mut order)?;
        self.orders.push(order);
        Ok(self)
    }

    pub fn add_orders<I>(&mut self, orders: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Order>,
    {
        for order in orders {
            self.add_order(order)?;
        }
        Ok(self)
    }

    /// Replace all sort keys.
    pub fn set_orders<I>(&mut self, orders: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Order>,
    {
        self.orders.clear();
        self.add_orders(orders)
    }

    pub fn add_order_data(&mut self, data: OrderData) -> Result<&mut Self> {
        self.add_order(Order::from_data(data)?)
    }

    /// Shorthand for a sort key on a property identifier.
    pub fn order_by(&mut self, property: &str, mode: OrderMode) -> Result<&mut Self> {
        self.add_order(Order::new(property, mode)?)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn has_orders(&self) -> bool {
        !self.orders.is_empty()
    }

    pub fn set_pagination(&mut self, pagination: Pagination) -> &mut Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn set_pagination_data(&mut self, data: PaginationData) -> Result<&mut Self> {
        self.pagination = Some(Pagination::from_data(data)?);
        Ok(self)
    }

    /// The pagination window, created with defaults on first access.
    pub fn pagination(&mut self) -> &mut Pagination {
        self.pagination.get_or_insert_with(Pagination::default)
    }

    /// The pagination window, if one has been set.
    pub fn current_pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.pagination.map_or(1, |p| p.page())
    }

    pub fn set_page(&mut self, page: u32) -> Result<&mut Self> {
        self.pagination().set_page(page)?;
        Ok(self)
    }

    pub fn num_per_page(&self) -> u32 {
        self.pagination.map_or(0, |p| p.num_per_page())
    }

    pub fn set_num_per_page(&mut self, num: u32) -> &mut Self {
        self.pagination().set_num_per_page(num);
        self
    }

    /// Upgrade a raw identifier the bound model recognizes into a structured
    /// property reference. A multi-valued property always matches by set
    /// membership, whatever operator was requested; a localized property
    /// filters on its active-locale field.
    fn resolve_filter(&self, filter: &mut Filter) -> Result<()> {
        let Some(model) = &self.model else {
            return Ok(());
        };
        let ident = match filter.field().property() {
            Some(PropertyRef::Ident(ident)) => ident.clone(),
            _ => return Ok(()),
        };
        if let Some(property) = model.property(&ident) {
            if property.multiple() {
                filter.set_operator(Operator::FindInSet);
            }
            if property.l10n() {
                filter.set_property_ident(&property.l10n_ident())?;
            } else {
                filter.set_property(property)?;
            }
        }
        Ok(())
    }

    /// Resolve a sort key's raw identifier. A localized property sorts on its
    /// active-locale field only.
    fn resolve_order(&self, order: &mut Order) -> Result<()> {
        let Some(model) = &self.model else {
            return Ok(());
        };
        let ident = match order.field().property() {
            Some(PropertyRef::Ident(ident)) => ident.clone(),
            _ => return Ok(()),
        };
        if let Some(property) = model.property(&ident) {
            if property.l10n() {
                order.set_property_ident(&property.l10n_ident())?;
            } else {
                order.set_property(property)?;
            }
        }
        Ok(())
    }
}

/// The storage contract concrete backends implement.
///
/// All criteria live in the shared [`SourceBase`], reachable through
/// [`Source::base`] / [`Source::base_mut`].
pub trait Source<M: Model + Clone> {
    fn base(&self) -> &SourceBase<M>;

    fn base_mut(&mut self) -> &mut SourceBase<M>;

    /// Load the single entity matching an identity key value.
    ///
    /// Returns `Ok(None)` when no row matches. Fails with `InvalidArgument`
    /// on a null key.
    fn load_item(&self, key: &Value) -> Result<Option<M>>;

    /// Like [`Source::load_item`], loading into a clone of an explicit
    /// template instead of the bound model.
    fn load_item_into(&self, key: &Value, template: &M) -> Result<Option<M>>;

    /// Load the single entity whose property matches a value.
    ///
    /// A localized property is matched on its active-locale field; an
    /// identifier the bound model does not recognize is used as a raw
    /// column. Returns `Ok(None)` when no row matches.
    fn load_from(&self, property: &str, value: &Value) -> Result<Option<M>>;

    /// Load every entity matching the accumulated criteria.
    fn load_items(&self) -> Result<Collection<M>>;

    /// Persist a new entity; returns its identity key value.
    fn save_item(&self, obj: &M) -> Result<Value>;

    /// Update an existing entity, optionally restricted to a property subset.
    ///
    /// Returns whether a stored row was changed.
    fn update_item(&self, obj: &M, properties: Option<&[&str]>) -> Result<bool>;

    /// Delete an entity by its identity key; `None` deletes the entity the
    /// bound model template identifies.
    ///
    /// Returns whether a stored row was removed. Fails with `InvalidArgument`
    /// before touching storage when the identity key is null.
    fn delete_item(&self, obj: Option<&M>) -> Result<bool>;
}
