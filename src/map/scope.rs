//! # Map Scopes
//!
//! Lazy spatial queries anchored at a position: what is visible, traversable
//! or reachable within a radius. Nothing is computed until one of the views
//! is iterated, and every call to a view runs the query again.

use crate::{Actor, Item, Map, Position, Tile};

/// Semantics of a [`MapScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeType {
    /// In line of sight of the center
    Visible,
    /// Walkable, but not necessarily connected to the center
    Traversable,
    /// Connected to the center by a free path
    Reachable,
}

/// Extra condition applied to every position of a scope.
pub enum ScopeFilter<'a> {
    /// Arbitrary test on the position
    Predicate(Box<dyn Fn(Position) -> bool + 'a>),
    /// An actor stands there; of this kind when one is given
    Actor(Option<String>),
    /// An item lies there; of this kind when one is given
    Item(Option<String>),
}

impl<'a> ScopeFilter<'a> {
    /// Wraps a closure as a position predicate.
    pub fn predicate(pred: impl Fn(Position) -> bool + 'a) -> Self {
        ScopeFilter::Predicate(Box::new(pred))
    }

    fn accepts(&self, map: &Map, pos: Position) -> bool {
        match self {
            ScopeFilter::Predicate(pred) => pred(pos),
            ScopeFilter::Actor(kind) => map
                .actor_at(pos)
                .is_some_and(|actor| kind.as_ref().map_or(true, |k| *k == actor.kind)),
            ScopeFilter::Item(kind) => map.items_at(pos).is_some_and(|stack| {
                stack
                    .iter()
                    .any(|item| kind.as_ref().map_or(true, |k| *k == item.kind))
            }),
        }
    }
}

/// A lazy, restartable spatial query over a map.
///
/// # Examples
///
/// ```
/// use delve::{Actor, Map, Position, ScopeFilter, Tile};
///
/// let mut map = Map::new(9, 9, Tile::Floor);
/// let me = Position::new(4, 4);
/// map.place(Actor::new("rat", 'r'), Position::new(5, 5), false).unwrap();
///
/// let scope = map.visible_scope(me, 2).with_filter(ScopeFilter::Actor(None));
/// assert_eq!(scope.actors().count(), 1);
/// ```
pub struct MapScope<'m> {
    map: &'m Map,
    scope_type: ScopeType,
    center: Position,
    radius: u32,
    filter: Option<ScopeFilter<'m>>,
    include_center: bool,
}

impl<'m> MapScope<'m> {
    pub fn new(map: &'m Map, scope_type: ScopeType, center: Position, radius: u32) -> Self {
        Self {
            map,
            scope_type,
            center,
            radius,
            filter: None,
            include_center: false,
        }
    }

    /// Only keep positions accepted by `filter`.
    pub fn with_filter(mut self, filter: ScopeFilter<'m>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Also consider the center itself.
    pub fn include_center(mut self, include: bool) -> Self {
        self.include_center = include;
        self
    }

    pub fn scope_type(&self) -> ScopeType {
        self.scope_type
    }

    pub fn center(&self) -> Position {
        self.center
    }

    fn unfiltered(&self) -> Box<dyn Iterator<Item = Position> + 'm> {
        let map = self.map;
        let center = self.center;
        // rings of growing radius, nearest first
        let disc = (1..=self.radius).flat_map(move |r| map.ring(center, r));
        match self.scope_type {
            ScopeType::Visible => {
                Box::new(disc.filter(move |pos| map.line_of_sight(center, *pos).is_some()))
            }
            ScopeType::Traversable => Box::new(disc.filter(move |pos| map.is_walkable(*pos))),
            ScopeType::Reachable => {
                let metrics = map.dist_metrics(center, None, Some(self.radius));
                let mut coords: Vec<Position> =
                    metrics.coords().filter(|pos| *pos != center).collect();
                coords.sort_by_key(|pos| (metrics.get(*pos), *pos));
                Box::new(coords.into_iter())
            }
        }
    }

    /// Positions in the scope.
    pub fn iter(&self) -> Box<dyn Iterator<Item = Position> + '_> {
        let head = self.include_center.then_some(self.center);
        Box::new(
            head.into_iter()
                .chain(self.unfiltered())
                .filter(move |pos| match &self.filter {
                    Some(filter) => filter.accepts(self.map, *pos),
                    None => true,
                }),
        )
    }

    /// Positions in the scope, collected.
    pub fn coords(&self) -> Vec<Position> {
        self.iter().collect()
    }

    /// Actors standing inside the scope.
    pub fn actors(&self) -> Box<dyn Iterator<Item = (Position, &'m Actor)> + '_> {
        let map = self.map;
        Box::new(
            self.iter()
                .filter_map(move |pos| map.actor_at(pos).map(|actor| (pos, actor))),
        )
    }

    /// Every item of every stack inside the scope.
    pub fn items(&self) -> Box<dyn Iterator<Item = (Position, &'m Item)> + '_> {
        let map = self.map;
        Box::new(self.iter().flat_map(move |pos| {
            map.items_at(pos)
                .into_iter()
                .flatten()
                .map(move |item| (pos, item))
        }))
    }

    /// Terrain of every position inside the scope.
    pub fn tiles(&self) -> Box<dyn Iterator<Item = (Position, &'m Tile)> + '_> {
        let map = self.map;
        Box::new(
            self.iter()
                .filter_map(move |pos| map.get_tile(pos).map(|tile| (pos, tile))),
        )
    }
}

impl Map {
    /// Positions within `radius` that `at` has a line of sight to.
    pub fn visible_scope(&self, at: Position, radius: u32) -> MapScope<'_> {
        MapScope::new(self, ScopeType::Visible, at, radius)
    }

    /// Walkable positions within `radius` of `at`, connected or not.
    pub fn traversable_scope(&self, at: Position, radius: u32) -> MapScope<'_> {
        MapScope::new(self, ScopeType::Traversable, at, radius)
    }

    /// Positions reachable from `at` in at most `radius` steps.
    pub fn reachable_scope(&self, at: Position, radius: u32) -> MapScope<'_> {
        MapScope::new(self, ScopeType::Reachable, at, radius)
    }
}
