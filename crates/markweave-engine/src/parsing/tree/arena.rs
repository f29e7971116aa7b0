use std::{fmt, hash, marker::PhantomData, ops};

/// A typed index into an [`Arena`].
///
/// Ids are plain integers, so parent/child/sibling relations never own each
/// other and the tree can be freely re-linked while parsing.
pub struct Id<T> {
    index: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    fn new(index: usize) -> Self {
        let index = u32::try_from(index).expect("arena exceeded u32::MAX nodes");
        Self {
            index,
            marker: PhantomData,
        }
    }

    /// Position of the node in allocation order.
    #[must_use]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Id<T> {}

impl<T> hash::Hash for Id<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Structural links of one node.
pub struct Links<T> {
    pub parent: Option<Id<T>>,
    pub first_child: Option<Id<T>>,
    pub last_child: Option<Id<T>>,
    pub prev: Option<Id<T>>,
    pub next: Option<Id<T>>,
}

impl<T> Default for Links<T> {
    fn default() -> Self {
        Self {
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        }
    }
}

impl<T> Clone for Links<T> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent,
            first_child: self.first_child,
            last_child: self.last_child,
            prev: self.prev,
            next: self.next,
        }
    }
}

impl<T> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent)
            .field("first_child", &self.first_child)
            .field("last_child", &self.last_child)
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    links: Links<T>,
}

/// Node storage for one tree shape (blocks or inlines).
///
/// Nodes are never freed; a detached node simply has no links.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Allocates a detached node.
    pub fn alloc(&mut self, value: T) -> Id<T> {
        let id = Id::new(self.slots.len());
        self.slots.push(Slot {
            value,
            links: Links::default(),
        });
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: Id<T>) -> &T {
        &self.slots[id.index()].value
    }

    pub fn get_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.slots[id.index()].value
    }

    #[must_use]
    pub fn links(&self, id: Id<T>) -> &Links<T> {
        &self.slots[id.index()].links
    }

    fn links_mut(&mut self, id: Id<T>) -> &mut Links<T> {
        &mut self.slots[id.index()].links
    }

    #[must_use]
    pub fn parent(&self, id: Id<T>) -> Option<Id<T>> {
        self.links(id).parent
    }

    #[must_use]
    pub fn first_child(&self, id: Id<T>) -> Option<Id<T>> {
        self.links(id).first_child
    }

    #[must_use]
    pub fn last_child(&self, id: Id<T>) -> Option<Id<T>> {
        self.links(id).last_child
    }

    #[must_use]
    pub fn next(&self, id: Id<T>) -> Option<Id<T>> {
        self.links(id).next
    }

    #[must_use]
    pub fn prev(&self, id: Id<T>) -> Option<Id<T>> {
        self.links(id).prev
    }

    /// Unlinks `id` from its parent and siblings. Its own children stay attached.
    pub fn detach(&mut self, id: Id<T>) {
        let Links {
            parent, prev, next, ..
        } = self.links(id).clone();

        match prev {
            Some(p) => self.links_mut(p).next = next,
            None => {
                if let Some(parent) = parent {
                    self.links_mut(parent).first_child = next;
                }
            }
        }
        match next {
            Some(n) => self.links_mut(n).prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.links_mut(parent).last_child = prev;
                }
            }
        }

        let links = self.links_mut(id);
        links.parent = None;
        links.prev = None;
        links.next = None;
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: Id<T>, child: Id<T>) {
        self.detach(child);
        let last = self.links(parent).last_child;
        {
            let links = self.links_mut(child);
            links.parent = Some(parent);
            links.prev = last;
        }
        match last {
            Some(last) => self.links_mut(last).next = Some(child),
            None => self.links_mut(parent).first_child = Some(child),
        }
        self.links_mut(parent).last_child = Some(child);
    }

    /// Inserts `node` as the next sibling of `anchor`, detaching it first.
    pub fn insert_after(&mut self, anchor: Id<T>, node: Id<T>) {
        self.detach(node);
        let Links { parent, next, .. } = self.links(anchor).clone();
        {
            let links = self.links_mut(node);
            links.parent = parent;
            links.prev = Some(anchor);
            links.next = next;
        }
        self.links_mut(anchor).next = Some(node);
        match next {
            Some(n) => self.links_mut(n).prev = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.links_mut(parent).last_child = Some(node);
                }
            }
        }
    }

    /// Iterates the direct children of `id` in order.
    #[must_use]
    pub fn children(&self, id: Id<T>) -> Children<'_, T> {
        Children {
            arena: self,
            next: self.first_child(id),
        }
    }

    /// Pre-order walk of `id` and everything below it.
    #[must_use]
    pub fn descendants(&self, id: Id<T>) -> Descendants<'_, T> {
        Descendants {
            arena: self,
            stack: vec![(id, 0)],
        }
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    #[must_use]
    pub fn ancestors(&self, id: Id<T>) -> Ancestors<'_, T> {
        Ancestors {
            arena: self,
            next: self.parent(id),
        }
    }
}

impl<T> ops::Index<Id<T>> for Arena<T> {
    type Output = T;

    fn index(&self, id: Id<T>) -> &T {
        self.get(id)
    }
}

impl<T> ops::IndexMut<Id<T>> for Arena<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        self.get_mut(id)
    }
}

pub struct Children<'a, T> {
    arena: &'a Arena<T>,
    next: Option<Id<T>>,
}

impl<T> Iterator for Children<'_, T> {
    type Item = Id<T>;

    fn next(&mut self) -> Option<Id<T>> {
        let current = self.next?;
        self.next = self.arena.next(current);
        Some(current)
    }
}

/// Iterative pre-order traversal. Each stack entry carries the node's depth
/// relative to the starting node.
pub struct Descendants<'a, T> {
    arena: &'a Arena<T>,
    stack: Vec<(Id<T>, usize)>,
}

impl<T> Descendants<'_, T> {
    /// Like [`Iterator::next`] but also yields the depth below the start node.
    pub fn next_with_depth(&mut self) -> Option<(Id<T>, usize)> {
        let (id, depth) = self.stack.pop()?;
        if let Some(next) = self.arena.next(id)
            && depth > 0
        {
            self.stack.push((next, depth));
        }
        if let Some(child) = self.arena.first_child(id) {
            self.stack.push((child, depth + 1));
        }
        Some((id, depth))
    }
}

impl<T> Iterator for Descendants<'_, T> {
    type Item = Id<T>;

    fn next(&mut self) -> Option<Id<T>> {
        self.next_with_depth().map(|(id, _)| id)
    }
}

pub struct Ancestors<'a, T> {
    arena: &'a Arena<T>,
    next: Option<Id<T>>,
}

impl<T> Iterator for Ancestors<'_, T> {
    type Item = Id<T>;

    fn next(&mut self) -> Option<Id<T>> {
        let current = self.next?;
        self.next = self.arena.parent(current);
        Some(current)
    }
}
