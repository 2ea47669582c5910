use crate::prelude::*;

///
/// Association
/// resolved edge kept on the owning field
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Association {
    pub kind: AssociationKind,

    /// Qualified name of the peer entity.
    pub peer: String,

    /// Column holding the reference: on the peer for has-one/has-many, on
    /// the owner for belongs-to, and the owner key for many-to-many.
    pub foreign_key: String,

    /// Column the foreign key points at.
    pub association_foreign_key: String,

    /// `None` for belongs-to, which the update cascade never touches.
    pub cascade: Option<Cascade>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<JoinTable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_field: Option<String>,

    pub flags: AssociationFlags,
}

impl Association {
    /// Singular edges are stored as `Option<Box<PeerORM>>`.
    #[must_use]
    pub const fn is_many(&self) -> bool {
        self.kind.is_many()
    }

    /// Edges whose children live in their own table keyed by the owner.
    #[must_use]
    pub const fn is_child(&self) -> bool {
        matches!(self.kind, AssociationKind::HasOne | AssociationKind::HasMany)
    }
}

///
/// JoinTable
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JoinTable {
    pub name: String,
    pub foreign_key: String,
    pub association_foreign_key: String,
}

///
/// AssociationFlags
/// storage hints carried through to the rendered tag
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AssociationFlags {
    pub autoupdate: bool,
    pub autocreate: bool,
    pub save_reference: bool,
    pub preload: bool,
    pub clear: bool,
    pub append: bool,
    pub replace: bool,
}

impl AssociationFlags {
    /// Update cascade for an edge kind; flags resolve clear, append, then
    /// replace.
    #[must_use]
    pub const fn cascade(&self, kind: AssociationKind) -> Option<Cascade> {
        match kind {
            AssociationKind::BelongsTo => None,
            _ if self.clear => Some(Cascade::Clear),
            _ if self.append => Some(Cascade::Append),
            _ if self.replace => Some(Cascade::Replace),
            AssociationKind::ManyToMany => Some(Cascade::Replace),
            AssociationKind::HasOne | AssociationKind::HasMany => Some(Cascade::Remove),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_precedence() {
        let all = AssociationFlags {
            clear: true,
            append: true,
            replace: true,
            ..Default::default()
        };
        let append = AssociationFlags {
            append: true,
            replace: true,
            ..Default::default()
        };
        let none = AssociationFlags::default();

        assert_eq!(all.cascade(AssociationKind::HasMany), Some(Cascade::Clear));
        assert_eq!(append.cascade(AssociationKind::HasOne), Some(Cascade::Append));
        assert_eq!(none.cascade(AssociationKind::HasOne), Some(Cascade::Remove));
        assert_eq!(none.cascade(AssociationKind::HasMany), Some(Cascade::Remove));
        assert_eq!(none.cascade(AssociationKind::ManyToMany), Some(Cascade::Replace));
        assert_eq!(all.cascade(AssociationKind::BelongsTo), None, "belongs-to never cascades");
    }
}
