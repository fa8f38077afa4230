/// Ordered child-id sequences
///
/// Both parent levels of the hierarchy (project → lists, list → tasks) order
/// their children by position in an id sequence. Every mutation of such a
/// sequence in this crate goes through `IdSequence`, so the rules (clamped
/// insertion, exclusive membership, conflict on a missing member) live in
/// one place instead of at each call site.
///
/// # Position rules
///
/// - Inserting at an index past the end appends.
/// - A move removes the id first, then inserts at the target index clamped
///   against the shortened sequence; moving to any oversized index therefore
///   lands the id at the end.
/// - Removing or moving an id that is not a member is an error: the caller
///   is operating on a stale view of the sequence.

use uuid::Uuid;

/// Errors from sequence mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    /// The id is not a member of the sequence (stale caller state)
    #[error("id {0} is not in the sequence")]
    NotAMember(Uuid),

    /// The id is already a member; membership is exclusive
    #[error("id {0} is already in the sequence")]
    AlreadyAMember(Uuid),
}

/// Ordered sequence of child ids with exclusive membership
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSequence(Vec<Uuid>);

impl IdSequence {
    /// Wraps an existing id vector (as read from a parent entity)
    pub fn new(ids: Vec<Uuid>) -> Self {
        Self(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.0.contains(&id)
    }

    /// Current position of an id, if it is a member
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.0.iter().position(|x| *x == id)
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Uuid> {
        self.0
    }

    /// Appends an id at the end (lowest priority position)
    pub fn push(&mut self, id: Uuid) -> Result<(), SequenceError> {
        if self.contains(id) {
            return Err(SequenceError::AlreadyAMember(id));
        }
        self.0.push(id);
        Ok(())
    }

    /// Inserts an id at `index`, clamped so an oversized index appends
    pub fn insert_at(&mut self, index: usize, id: Uuid) -> Result<(), SequenceError> {
        if self.contains(id) {
            return Err(SequenceError::AlreadyAMember(id));
        }
        let index = index.min(self.0.len());
        self.0.insert(index, id);
        Ok(())
    }

    /// Removes an id, returning the position it held
    pub fn remove(&mut self, id: Uuid) -> Result<usize, SequenceError> {
        let pos = self.position(id).ok_or(SequenceError::NotAMember(id))?;
        self.0.remove(pos);
        Ok(pos)
    }

    /// Moves a member id to `index` within this sequence
    ///
    /// Remove-then-insert, so the target index is interpreted against the
    /// sequence without the moving element.
    pub fn move_to(&mut self, id: Uuid, index: usize) -> Result<(), SequenceError> {
        self.remove(id)?;
        // Cannot collide: the id was just removed.
        let index = index.min(self.0.len());
        self.0.insert(index, id);
        Ok(())
    }
}

impl From<Vec<Uuid>> for IdSequence {
    fn from(ids: Vec<Uuid>) -> Self {
        Self::new(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq_of(n: usize) -> (IdSequence, Vec<Uuid>) {
        let ids: Vec<Uuid> = (0..n).map(|_| Uuid::new_v4()).collect();
        (IdSequence::new(ids.clone()), ids)
    }

    #[test]
    fn test_push_appends_at_end() {
        let (mut seq, ids) = seq_of(2);
        let new_id = Uuid::new_v4();
        seq.push(new_id).unwrap();
        assert_eq!(seq.as_slice(), &[ids[0], ids[1], new_id]);
    }

    #[test]
    fn test_push_rejects_duplicate() {
        let (mut seq, ids) = seq_of(2);
        assert_eq!(seq.push(ids[0]), Err(SequenceError::AlreadyAMember(ids[0])));
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_insert_at_index() {
        let (mut seq, ids) = seq_of(3);
        let new_id = Uuid::new_v4();
        seq.insert_at(1, new_id).unwrap();
        assert_eq!(seq.as_slice(), &[ids[0], new_id, ids[1], ids[2]]);
    }

    #[test]
    fn test_insert_past_end_appends() {
        let (mut seq, ids) = seq_of(2);
        let new_id = Uuid::new_v4();
        seq.insert_at(99, new_id).unwrap();
        assert_eq!(seq.as_slice(), &[ids[0], ids[1], new_id]);
    }

    #[test]
    fn test_remove_returns_position() {
        let (mut seq, ids) = seq_of(3);
        assert_eq!(seq.remove(ids[1]), Ok(1));
        assert_eq!(seq.as_slice(), &[ids[0], ids[2]]);
    }

    #[test]
    fn test_remove_missing_is_error() {
        let (mut seq, _) = seq_of(3);
        let stranger = Uuid::new_v4();
        assert_eq!(seq.remove(stranger), Err(SequenceError::NotAMember(stranger)));
    }

    #[test]
    fn test_move_last_to_front() {
        // [T1, T2, T3], move T3 to 0 -> [T3, T1, T2]
        let (mut seq, ids) = seq_of(3);
        seq.move_to(ids[2], 0).unwrap();
        assert_eq!(seq.as_slice(), &[ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn test_move_to_middle() {
        let (mut seq, ids) = seq_of(4);
        seq.move_to(ids[0], 2).unwrap();
        assert_eq!(seq.as_slice(), &[ids[1], ids[2], ids[0], ids[3]]);
    }

    #[test]
    fn test_move_to_oversized_index_appends() {
        let (mut seq, ids) = seq_of(3);
        seq.move_to(ids[0], 42).unwrap();
        assert_eq!(seq.as_slice(), &[ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_move_preserves_membership() {
        let (mut seq, mut ids) = seq_of(5);
        seq.move_to(ids[3], 1).unwrap();
        assert_eq!(seq.len(), 5);
        ids.sort();
        let mut after = seq.into_inner();
        after.sort();
        assert_eq!(after, ids);
    }

    #[test]
    fn test_move_missing_is_error() {
        let (mut seq, _) = seq_of(2);
        let stranger = Uuid::new_v4();
        assert_eq!(seq.move_to(stranger, 0), Err(SequenceError::NotAMember(stranger)));
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_move_within_single_element_sequence() {
        let (mut seq, ids) = seq_of(1);
        seq.move_to(ids[0], 0).unwrap();
        assert_eq!(seq.as_slice(), &[ids[0]]);
    }
}
