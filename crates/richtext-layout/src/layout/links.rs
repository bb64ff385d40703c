//! Link consolidation
//!
//! One `<a>` element that wraps across lines is laid out as one fragment
//! per line. After all lines are final those fragments are lifted out of
//! their lines into a single [`LinkGroup`], keeping their rendered position.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use richtext_dom::{MarkupTree, NodeId};
use serde::{Serialize, Serializer};

use super::assembler::Line;
use super::box_model::Rect;
use super::fragment::{Fragment, FragmentId, LinkSlot};

/// Where a link goes.
#[derive(Clone)]
pub enum LinkTarget {
    /// A URL the host should open.
    Url(String),
    /// Code to run on activation.
    Callback(Rc<dyn Fn()>),
}

impl LinkTarget {
    /// Wrap a closure.
    #[must_use]
    pub fn callback(callback: impl Fn() + 'static) -> Self {
        Self::Callback(Rc::new(callback))
    }
}

impl fmt::Debug for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl Serialize for LinkTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Url(url) => serializer.serialize_str(url),
            Self::Callback(_) => serializer.serialize_str("<callback>"),
        }
    }
}

/// A resolved anchor fragment, recorded while lines are being built.
#[derive(Debug, Clone)]
pub struct LinkRecord {
    /// The `<a>` element it came from.
    pub source: NodeId,
    /// The fragment laid out for it on one line.
    pub fragment: FragmentId,
    /// Its resolved target.
    pub target: LinkTarget,
}

/// One fragment of a link group.
#[derive(Debug, Clone, Serialize)]
pub struct LinkMember {
    /// Index of the line the fragment was laid out on.
    pub line: usize,
    /// The fragment, its transform now absolute.
    pub fragment: Fragment,
}

/// Every fragment of one logical link under one interactive parent.
#[derive(Debug, Clone, Serialize)]
pub struct LinkGroup {
    /// Target shared by all members.
    pub href: LinkTarget,
    /// Accessible label: the anchor's text content.
    pub label: String,
    /// Whether input events on the link are marked handled.
    pub events_handled: bool,
    /// Fragments in line order.
    pub members: Vec<LinkMember>,
}

impl LinkGroup {
    /// Union of the members' absolute bounds.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        Rect::union_all(self.members.iter().filter_map(|member| member.fragment.bounds()))
    }

    /// Follow the link: runs a callback target, or returns the URL for the
    /// host to open.
    #[must_use]
    pub fn activate(&self) -> Option<&str> {
        match &self.href {
            LinkTarget::Url(url) => Some(url),
            LinkTarget::Callback(callback) => {
                callback();
                None
            }
        }
    }
}

/// Group `records` by source element and move their fragments out of
/// `lines`. A record whose fragment can no longer be found is dropped, and a
/// group left with no members is not created.
pub fn consolidate(
    lines: &mut [Line],
    records: Vec<LinkRecord>,
    tree: &MarkupTree,
    events_handled: bool,
) -> Vec<LinkGroup> {
    let mut pending: VecDeque<LinkRecord> = records.into();
    let mut groups = Vec::new();

    while let Some(first) = pending.pop_front() {
        let (same, rest): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|record| record.source == first.source);
        pending = rest.into();

        let mut members = Vec::new();
        for record in std::iter::once(&first).chain(&same) {
            let slot = LinkSlot {
                group: groups.len(),
                member: members.len(),
            };
            let found = lines.iter_mut().enumerate().find_map(|(index, line)| {
                line.content
                    .detach(record.fragment, &line.transform, slot)
                    .map(|fragment| LinkMember {
                        line: index,
                        fragment,
                    })
            });
            if let Some(member) = found {
                members.push(member);
            }
        }

        if members.is_empty() {
            log::debug!("link from {:?} lost all of its fragments", first.source);
            continue;
        }
        groups.push(LinkGroup {
            label: tree.text_content(first.source),
            href: first.target,
            events_handled,
            members,
        });
    }
    groups
}
