//! Resource descriptors: the static table of attributes and relationships
//! for one resource type, with type-erased accessors.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use bitflags::bitflags;
use compact_str::CompactString;
use hashbrown::HashMap;
use heck::ToKebabCase;
use hypermedia_types::RESERVED_MEMBER_NAMES;

use super::Resource;
use super::compare::{Comparator, ComparisonOverrides, default_comparator};
use super::value::{FieldType, FieldValue, IntoFieldValue};
use crate::config::canonical_name;
use crate::error::{ApiError, Result};

/// Shared handle to a domain object.
pub type ObjectRef = Arc<dyn Any + Send + Sync>;

type ValueGetter = Arc<dyn Fn(&dyn Any) -> Option<FieldValue> + Send + Sync>;
type RelatedGetter = Arc<dyn Fn(&dyn Any) -> Option<Related> + Send + Sync>;
type MetaGetter = Arc<dyn Fn(&[ObjectRef], bool) -> Option<serde_json::Value> + Send + Sync>;

bitflags! {
    /// Which links are generated for a resource or relationship.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LinkVisibility: u8 {
        /// No links.
        const NONE = 0;

        /// `self` on resource objects and relationship objects.
        const SELF = 1 << 0;

        /// `related` on relationship objects.
        const RELATED = 1 << 1;

        /// Top-level `self`.
        const TOP_SELF = 1 << 2;

        /// Everything.
        const ALL = Self::SELF.bits() | Self::RELATED.bits() | Self::TOP_SELF.bits();
    }
}

impl Default for LinkVisibility {
    fn default() -> Self {
        LinkVisibility::ALL
    }
}

/// Cardinality of a relationship
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipKind {
    ToOne,
    ToMany,
}

/// Value of a relationship property read from a domain object.
#[derive(Clone)]
pub enum Related {
    One(Option<ObjectRef>),
    Many(Vec<ObjectRef>),
}

impl Related {
    /// Every related object, in property order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> {
        let slice: &[ObjectRef] = match self {
            Related::One(None) => &[],
            Related::One(Some(obj)) => core::slice::from_ref(obj),
            Related::Many(objs) => objs,
        };
        slice.iter()
    }
}

impl core::fmt::Debug for Related {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Related::One(obj) => write!(f, "One({})", if obj.is_some() { "Some" } else { "None" }),
            Related::Many(objs) => write!(f, "Many(len = {})", objs.len()),
        }
    }
}

/// Lazily resolved reference to another resource type.
///
/// Holding the constructor instead of the descriptor lets schemas refer to
/// themselves (`person.friends`) or to each other.
#[derive(Clone, Copy)]
pub struct RelatedType {
    type_id: TypeId,
    type_name: &'static str,
    describe: fn() -> Result<ResourceDescriptor>,
}

impl RelatedType {
    pub fn of<R: Resource>() -> Self {
        Self {
            type_id: TypeId::of::<R>(),
            type_name: std::any::type_name::<R>(),
            describe: R::descriptor,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name, for diagnostics.
    pub fn rust_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn describe(&self) -> Result<ResourceDescriptor> {
        (self.describe)()
    }
}

impl core::fmt::Debug for RelatedType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("RelatedType").field(&self.type_name).finish()
    }
}

/// A scalar property (attribute or identifier).
#[derive(Clone)]
pub struct AttributeDescriptor {
    name: CompactString,
    field_type: FieldType,
    getter: ValueGetter,
    comparator: Comparator,
}

impl AttributeDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Reads the property. `None` when the object doesn't carry it.
    pub fn value(&self, object: &dyn Any) -> Option<FieldValue> {
        (self.getter)(object)
    }

    /// Filter comparison bound to this property's type.
    pub fn matches(&self, value: &FieldValue, expected: &FieldValue) -> bool {
        (self.comparator)(value, expected)
    }

    /// Parses a raw query value into this property's type.
    pub fn parse(&self, raw: &str) -> core::result::Result<FieldValue, String> {
        self.field_type.parse(raw)
    }
}

impl core::fmt::Debug for AttributeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish()
    }
}

/// A named link to another resource type.
#[derive(Clone)]
pub struct RelationshipDescriptor {
    name: CompactString,
    kind: RelationshipKind,
    related: RelatedType,
    url_segment: CompactString,
    link_visibility: LinkVisibility,
    getter: RelatedGetter,
}

impl RelationshipDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn related(&self) -> &RelatedType {
        &self.related
    }

    pub fn url_segment(&self) -> &str {
        &self.url_segment
    }

    pub fn link_visibility(&self) -> LinkVisibility {
        self.link_visibility
    }

    /// Reads the relationship. `None` when the object doesn't carry the property.
    pub fn value(&self, object: &dyn Any) -> Option<Related> {
        (self.getter)(object)
    }
}

impl core::fmt::Debug for RelationshipDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RelationshipDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("related", &self.related)
            .field("url_segment", &self.url_segment)
            .finish()
    }
}

/// Options for a relationship declared on a [`DescriptorBuilder`].
#[derive(Clone, Debug)]
pub struct RelationshipOptions {
    url_segment: Option<CompactString>,
    links: LinkVisibility,
}

impl Default for RelationshipOptions {
    fn default() -> Self {
        Self {
            url_segment: None,
            links: LinkVisibility::SELF | LinkVisibility::RELATED,
        }
    }
}

impl RelationshipOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path segment used in relationship links (defaults to the kebab-cased name).
    pub fn url_segment(mut self, segment: impl Into<CompactString>) -> Self {
        self.url_segment = Some(segment.into());
        self
    }

    pub fn links(mut self, links: LinkVisibility) -> Self {
        self.links = links;
        self
    }
}

#[derive(Clone, Copy, Debug)]
enum FieldSlot {
    Id,
    Attribute(usize),
}

/// Immutable description of one resource type.
#[derive(Clone)]
pub struct ResourceDescriptor {
    type_id: TypeId,
    type_name: CompactString,
    url_path: CompactString,
    id: AttributeDescriptor,
    attributes: Vec<AttributeDescriptor>,
    relationships: Vec<RelationshipDescriptor>,
    link_visibility: LinkVisibility,
    meta: Option<MetaGetter>,
    fields: HashMap<String, FieldSlot>,
}

impl ResourceDescriptor {
    /// Starts describing domain type `T` as resource type `type_name`.
    pub fn builder<T: Any + Send + Sync>(type_name: impl Into<CompactString>) -> DescriptorBuilder<T> {
        DescriptorBuilder {
            type_name: type_name.into(),
            url_path: None,
            id: None,
            attributes: Vec::new(),
            relationships: Vec::new(),
            link_visibility: LinkVisibility::ALL,
            meta: None,
            _marker: PhantomData,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn url_path(&self) -> &str {
        &self.url_path
    }

    pub fn id_property(&self) -> &str {
        self.id.name()
    }

    pub fn id_field(&self) -> &AttributeDescriptor {
        &self.id
    }

    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn relationships(&self) -> &[RelationshipDescriptor] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipDescriptor> {
        let name = canonical_name(name);
        self.relationships
            .iter()
            .find(|rel| canonical_name(rel.name()) == name)
    }

    pub fn link_visibility(&self) -> LinkVisibility {
        self.link_visibility
    }

    /// Identifier of `object` rendered as a wire id, if it has one.
    pub fn id_of(&self, object: &dyn Any) -> Option<String> {
        self.id.value(object).and_then(|v| v.to_id_string())
    }

    /// Resolves a query property (`first-name`, `firstName`, `first_name`, `id`)
    /// to the identifier or an attribute.
    pub fn field(&self, name: &str) -> Option<&AttributeDescriptor> {
        match self.fields.get(&canonical_name(name))? {
            FieldSlot::Id => Some(&self.id),
            FieldSlot::Attribute(idx) => self.attributes.get(*idx),
        }
    }

    /// Top-level metadata for a response made of `objects`.
    pub fn meta(&self, objects: &[ObjectRef], is_collection: bool) -> Option<serde_json::Value> {
        self.meta.as_ref().and_then(|meta| meta(objects, is_collection))
    }

    /// Swaps the default comparison for registered overrides.
    pub(crate) fn bind_comparators(&mut self, overrides: &ComparisonOverrides) {
        self.id.comparator = overrides.resolve(self.id.field_type);
        for attr in &mut self.attributes {
            attr.comparator = overrides.resolve(attr.field_type);
        }
    }
}

impl core::fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("type_name", &self.type_name)
            .field("id", &self.id.name)
            .field("attributes", &self.attributes)
            .field("relationships", &self.relationships)
            .finish()
    }
}

/// Builder for [`ResourceDescriptor`].
///
/// ```ignore
/// ResourceDescriptor::builder::<Person>("person")
///     .id(|p| p.id)
///     .attribute("first_name", |p| p.first_name.clone())
///     .attribute("age", |p| p.age)
///     .to_one("job", |p| p.job.clone())
///     .to_many("friends", |p| p.friends.clone())
///     .build()
/// ```
pub struct DescriptorBuilder<T> {
    type_name: CompactString,
    url_path: Option<CompactString>,
    id: Option<AttributeDescriptor>,
    attributes: Vec<AttributeDescriptor>,
    relationships: Vec<RelationshipDescriptor>,
    link_visibility: LinkVisibility,
    meta: Option<MetaGetter>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> DescriptorBuilder<T> {
    /// Identifier read from the `id` property.
    pub fn id<V, F>(self, getter: F) -> Self
    where
        V: IntoFieldValue,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.id_property("id", getter)
    }

    /// Identifier read from a differently named property.
    pub fn id_property<V, F>(mut self, name: &str, getter: F) -> Self
    where
        V: IntoFieldValue,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.id = Some(scalar::<T, V, F>(name, getter));
        self
    }

    /// Attribute always present on `T`.
    pub fn attribute<V, F>(mut self, name: &str, getter: F) -> Self
    where
        V: IntoFieldValue,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.attributes.push(scalar::<T, V, F>(name, getter));
        self
    }

    /// Attribute that may be missing on some objects; `None` omits the member.
    pub fn attribute_with<F>(mut self, name: &str, field_type: FieldType, getter: F) -> Self
    where
        F: Fn(&T) -> Option<FieldValue> + Send + Sync + 'static,
    {
        self.attributes.push(AttributeDescriptor {
            name: name.into(),
            field_type,
            getter: Arc::new(move |obj: &dyn Any| obj.downcast_ref::<T>().and_then(&getter)),
            comparator: default_comparator(),
        });
        self
    }

    pub fn to_one<R, F>(self, name: &str, getter: F) -> Self
    where
        R: Resource,
        F: Fn(&T) -> Option<Arc<R>> + Send + Sync + 'static,
    {
        self.to_one_with(name, RelationshipOptions::default(), getter)
    }

    pub fn to_one_with<R, F>(mut self, name: &str, options: RelationshipOptions, getter: F) -> Self
    where
        R: Resource,
        F: Fn(&T) -> Option<Arc<R>> + Send + Sync + 'static,
    {
        let getter: RelatedGetter = Arc::new(move |obj: &dyn Any| {
            obj.downcast_ref::<T>()
                .map(|t| Related::One(getter(t).map(|r| r as ObjectRef)))
        });
        self.relationships.push(relationship::<R>(
            name,
            RelationshipKind::ToOne,
            options,
            getter,
        ));
        self
    }

    pub fn to_many<R, I, F>(self, name: &str, getter: F) -> Self
    where
        R: Resource,
        I: IntoIterator<Item = Arc<R>>,
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        self.to_many_with(name, RelationshipOptions::default(), getter)
    }

    pub fn to_many_with<R, I, F>(mut self, name: &str, options: RelationshipOptions, getter: F) -> Self
    where
        R: Resource,
        I: IntoIterator<Item = Arc<R>>,
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        let getter: RelatedGetter = Arc::new(move |obj: &dyn Any| {
            obj.downcast_ref::<T>().map(|t| {
                Related::Many(getter(t).into_iter().map(|r| r as ObjectRef).collect())
            })
        });
        self.relationships.push(relationship::<R>(
            name,
            RelationshipKind::ToMany,
            options,
            getter,
        ));
        self
    }

    /// URL path segment of the resource (defaults to the kebab-cased type name).
    pub fn url_path(mut self, path: impl Into<CompactString>) -> Self {
        self.url_path = Some(path.into());
        self
    }

    /// Resource-level link visibility (`SELF` for items, `TOP_SELF` for the document).
    pub fn links(mut self, links: LinkVisibility) -> Self {
        self.link_visibility = links;
        self
    }

    /// Top-level `meta` for responses of this resource type.
    pub fn meta<F>(mut self, meta: F) -> Self
    where
        F: Fn(&[&T], bool) -> Option<serde_json::Value> + Send + Sync + 'static,
    {
        self.meta = Some(Arc::new(move |objects: &[ObjectRef], many: bool| {
            let typed: Vec<&T> = objects
                .iter()
                .filter_map(|obj| (**obj).downcast_ref::<T>())
                .collect();
            meta(&typed, many)
        }));
        self
    }

    /// Validates and freezes the descriptor.
    pub fn build(self) -> Result<ResourceDescriptor> {
        let type_name = self.type_name;
        let id = self.id.ok_or_else(|| {
            ApiError::schema(format!("resource '{type_name}' has no identifier property"))
        })?;

        let mut fields = HashMap::new();
        fields.insert(canonical_name(id.name()), FieldSlot::Id);
        // `id` always reaches the identifier, whatever the property is called.
        fields.insert("id".to_string(), FieldSlot::Id);

        let mut seen: Vec<String> = Vec::new();
        let names = self
            .attributes
            .iter()
            .map(AttributeDescriptor::name)
            .chain(self.relationships.iter().map(RelationshipDescriptor::name));
        for name in names {
            let canonical = canonical_name(name);
            if RESERVED_MEMBER_NAMES.contains(&canonical.as_str()) {
                return Err(ApiError::schema(format!(
                    "resource '{type_name}' uses reserved member name '{name}'"
                )));
            }
            if seen.contains(&canonical) {
                return Err(ApiError::schema(format!(
                    "resource '{type_name}' declares '{name}' more than once"
                )));
            }
            seen.push(canonical);
        }

        for (idx, attr) in self.attributes.iter().enumerate() {
            fields.insert(canonical_name(attr.name()), FieldSlot::Attribute(idx));
        }

        let url_path = self
            .url_path
            .unwrap_or_else(|| type_name.to_kebab_case().into());

        Ok(ResourceDescriptor {
            type_id: TypeId::of::<T>(),
            type_name,
            url_path,
            id,
            attributes: self.attributes,
            relationships: self.relationships,
            link_visibility: self.link_visibility,
            meta: self.meta,
            fields,
        })
    }
}

fn scalar<T, V, F>(name: &str, getter: F) -> AttributeDescriptor
where
    T: Any,
    V: IntoFieldValue,
    F: Fn(&T) -> V + Send + Sync + 'static,
{
    AttributeDescriptor {
        name: name.into(),
        field_type: V::FIELD_TYPE,
        getter: Arc::new(move |obj: &dyn Any| {
            obj.downcast_ref::<T>().map(|t| getter(t).into_field_value())
        }),
        comparator: default_comparator(),
    }
}

fn relationship<R: Resource>(
    name: &str,
    kind: RelationshipKind,
    options: RelationshipOptions,
    getter: RelatedGetter,
) -> RelationshipDescriptor {
    RelationshipDescriptor {
        name: name.into(),
        kind,
        related: RelatedType::of::<R>(),
        url_segment: options
            .url_segment
            .unwrap_or_else(|| name.to_kebab_case().into()),
        link_visibility: options.links,
        getter,
    }
}
