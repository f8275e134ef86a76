//! Editor operations on the template tree.
//!
//! Every operation checks its preconditions before touching the tree, so a
//! failed call leaves the template unchanged. Every successful call leaves
//! sibling orders dense and zero-based, with storage order matching document
//! order.

use super::{Clause, Paragraph, Template, INTRODUCTION_ORDER, number_paragraphs};
use crate::condition::Condition;
use crate::error::{EngineError, Result};

impl Template {
    /// Insert a regular clause at `position` among the regular clauses.
    ///
    /// The clause's own paragraphs are renumbered in their current order.
    pub fn insert_clause(&mut self, mut clause: Clause, position: usize) -> Result<()> {
        self.ensure_clause_id_free(&clause.id, None)?;
        ensure_unique_paragraph_ids(&clause)?;
        let max = self.regular_count();
        if position > max {
            return Err(EngineError::InvalidPosition { position, max });
        }

        self.renumber();
        clause.order = 0;
        clause.renumber_paragraphs();
        let offset = self.introduction_count();
        self.clauses.insert(offset + position, clause);
        self.number_clauses();
        Ok(())
    }

    /// Install `clause` as the Introduction, returning the one it replaces.
    pub fn set_introduction(&mut self, mut clause: Clause) -> Result<Option<Clause>> {
        let replaced_id = self.introduction().map(|c| c.id.clone());
        self.ensure_clause_id_free(&clause.id, replaced_id.as_deref())?;
        ensure_unique_paragraph_ids(&clause)?;

        let replaced = match self.clauses.iter().position(|c| c.is_introduction()) {
            Some(index) => Some(self.clauses.remove(index)),
            None => None,
        };

        clause.order = INTRODUCTION_ORDER;
        clause.renumber_paragraphs();
        self.clauses.insert(0, clause);
        self.renumber();
        Ok(replaced)
    }

    /// Insert a paragraph into a clause at `position`.
    pub fn insert_paragraph(
        &mut self,
        clause_id: &str,
        paragraph: Paragraph,
        position: usize,
    ) -> Result<()> {
        let clause = self.existing_clause(clause_id)?;
        if clause.paragraph(&paragraph.id).is_some() {
            return Err(duplicate_paragraph(clause_id, &paragraph.id));
        }
        let max = clause.paragraphs.len();
        if position > max {
            return Err(EngineError::InvalidPosition { position, max });
        }

        let clause = self.existing_clause_mut(clause_id)?;
        clause.renumber_paragraphs();
        clause.paragraphs.insert(position, paragraph);
        number_paragraphs(&mut clause.paragraphs);
        Ok(())
    }

    /// Remove a clause and all its paragraphs.
    pub fn delete_clause(&mut self, clause_id: &str) -> Result<Clause> {
        let index = self
            .clauses
            .iter()
            .position(|c| c.id == clause_id)
            .ok_or_else(|| EngineError::NodeNotFound(format!("clause '{}'", clause_id)))?;
        let removed = self.clauses.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Remove a paragraph from a clause.
    pub fn delete_paragraph(&mut self, clause_id: &str, paragraph_id: &str) -> Result<Paragraph> {
        let clause = self.existing_clause_mut(clause_id)?;
        let index = clause
            .paragraphs
            .iter()
            .position(|p| p.id == paragraph_id)
            .ok_or_else(|| paragraph_not_found(clause_id, paragraph_id))?;
        let removed = clause.paragraphs.remove(index);
        clause.renumber_paragraphs();
        Ok(removed)
    }

    /// Move a regular clause to `position` among the regular clauses.
    pub fn move_clause(&mut self, clause_id: &str, position: usize) -> Result<()> {
        let clause = self.existing_clause(clause_id)?;
        if clause.is_introduction() {
            return Err(EngineError::UserError(format!(
                "clause '{}' is the introduction and always comes first\n\nFix: delete it and insert it as a regular clause",
                clause_id
            )));
        }
        let max = self.regular_count().saturating_sub(1);
        if position > max {
            return Err(EngineError::InvalidPosition { position, max });
        }

        self.renumber();
        let offset = self.introduction_count();
        let Some(index) = self.clauses.iter().position(|c| c.id == clause_id) else {
            return Err(EngineError::NodeNotFound(format!("clause '{}'", clause_id)));
        };
        let clause = self.clauses.remove(index);
        self.clauses.insert(offset + position, clause);
        self.number_clauses();
        Ok(())
    }

    /// Move a paragraph to `position` within its clause.
    pub fn move_paragraph(
        &mut self,
        clause_id: &str,
        paragraph_id: &str,
        position: usize,
    ) -> Result<()> {
        let clause = self.existing_clause(clause_id)?;
        if clause.paragraph(paragraph_id).is_none() {
            return Err(paragraph_not_found(clause_id, paragraph_id));
        }
        let max = clause.paragraphs.len().saturating_sub(1);
        if position > max {
            return Err(EngineError::InvalidPosition { position, max });
        }

        let clause = self.existing_clause_mut(clause_id)?;
        clause.renumber_paragraphs();
        let Some(index) = clause.paragraphs.iter().position(|p| p.id == paragraph_id) else {
            return Err(paragraph_not_found(clause_id, paragraph_id));
        };
        let paragraph = clause.paragraphs.remove(index);
        clause.paragraphs.insert(position, paragraph);
        number_paragraphs(&mut clause.paragraphs);
        Ok(())
    }

    /// Move a paragraph into another clause at `position`.
    pub fn move_paragraph_to(
        &mut self,
        from_clause_id: &str,
        paragraph_id: &str,
        to_clause_id: &str,
        position: usize,
    ) -> Result<()> {
        if from_clause_id == to_clause_id {
            return self.move_paragraph(from_clause_id, paragraph_id, position);
        }

        let source = self.existing_clause(from_clause_id)?;
        if source.paragraph(paragraph_id).is_none() {
            return Err(paragraph_not_found(from_clause_id, paragraph_id));
        }
        let target = self.existing_clause(to_clause_id)?;
        if target.paragraph(paragraph_id).is_some() {
            return Err(duplicate_paragraph(to_clause_id, paragraph_id));
        }
        let max = target.paragraphs.len();
        if position > max {
            return Err(EngineError::InvalidPosition { position, max });
        }

        let paragraph = self.delete_paragraph(from_clause_id, paragraph_id)?;
        let target = self.existing_clause_mut(to_clause_id)?;
        target.renumber_paragraphs();
        target.paragraphs.insert(position, paragraph);
        number_paragraphs(&mut target.paragraphs);
        Ok(())
    }

    /// Fold `source_id` into `target_id` and remove the source clause.
    ///
    /// The source's paragraphs are appended to the target's. A source with
    /// content of its own contributes it as a leading paragraph carrying the
    /// source's id and title. A conditional source has its condition AND-ed
    /// into every moved paragraph, so nothing appears that would not have
    /// appeared before the merge.
    ///
    /// Fails without changes if any moved paragraph id collides with one in
    /// the target.
    pub fn merge_clauses(&mut self, target_id: &str, source_id: &str) -> Result<()> {
        if target_id == source_id {
            return Err(EngineError::UserError(format!(
                "cannot merge clause '{}' into itself",
                target_id
            )));
        }
        let target = self.existing_clause(target_id)?;
        let source = self.existing_clause(source_id)?;

        let moved = merged_paragraphs(source);
        let mut taken: Vec<&str> = target.paragraphs.iter().map(|p| p.id.as_str()).collect();
        for paragraph in &moved {
            if taken.contains(&paragraph.id.as_str()) {
                return Err(duplicate_paragraph(target_id, &paragraph.id));
            }
            taken.push(&paragraph.id);
        }

        self.delete_clause(source_id)?;
        let target = self.existing_clause_mut(target_id)?;
        target.renumber_paragraphs();
        target.paragraphs.extend(moved);
        number_paragraphs(&mut target.paragraphs);
        Ok(())
    }

    /// Sort clauses and paragraphs into document order and make sibling
    /// orders dense and zero-based. The Introduction keeps order `-1`.
    pub fn renumber(&mut self) {
        self.clauses
            .sort_by_key(|c| (!c.is_introduction(), c.order));
        self.number_clauses();
        for clause in &mut self.clauses {
            clause.renumber_paragraphs();
        }
    }

    /// Assign regular clause orders by storage position.
    fn number_clauses(&mut self) {
        let mut next = 0;
        for clause in &mut self.clauses {
            if !clause.is_introduction() {
                clause.order = next;
                next += 1;
            }
        }
    }

    fn introduction_count(&self) -> usize {
        self.clauses.iter().filter(|c| c.is_introduction()).count()
    }

    fn regular_count(&self) -> usize {
        self.clauses.len() - self.introduction_count()
    }

    fn existing_clause(&self, clause_id: &str) -> Result<&Clause> {
        self.clause(clause_id)
            .ok_or_else(|| EngineError::NodeNotFound(format!("clause '{}'", clause_id)))
    }

    fn existing_clause_mut(&mut self, clause_id: &str) -> Result<&mut Clause> {
        self.clause_mut(clause_id)
            .ok_or_else(|| EngineError::NodeNotFound(format!("clause '{}'", clause_id)))
    }

    /// Fail if `id` is taken by a clause other than `except`.
    fn ensure_clause_id_free(&self, id: &str, except: Option<&str>) -> Result<()> {
        if except != Some(id) && self.clause(id).is_some() {
            return Err(EngineError::DuplicateIdentifier {
                scope: format!("template '{}'", self.id),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn merged_paragraphs(source: &Clause) -> Vec<Paragraph> {
    let mut moved = Vec::new();
    if !source.content.trim().is_empty() {
        moved.push(Paragraph::new(
            source.id.clone(),
            source.title.clone(),
            source.content.clone(),
        ));
    }
    moved.extend(source.paragraphs_in_order().into_iter().cloned());

    if let Some(gate) = &source.condition {
        for paragraph in &mut moved {
            paragraph.condition = Some(match paragraph.condition.take() {
                Some(own) => Condition::and(vec![gate.clone(), own]),
                None => gate.clone(),
            });
        }
    }
    moved
}

fn ensure_unique_paragraph_ids(clause: &Clause) -> Result<()> {
    for (i, paragraph) in clause.paragraphs.iter().enumerate() {
        if clause.paragraphs[..i].iter().any(|p| p.id == paragraph.id) {
            return Err(duplicate_paragraph(&clause.id, &paragraph.id));
        }
    }
    Ok(())
}

fn duplicate_paragraph(clause_id: &str, paragraph_id: &str) -> EngineError {
    EngineError::DuplicateIdentifier {
        scope: format!("clause '{}'", clause_id),
        id: paragraph_id.to_string(),
    }
}

fn paragraph_not_found(clause_id: &str, paragraph_id: &str) -> EngineError {
    EngineError::NodeNotFound(format!("paragraph '{}/{}'", clause_id, paragraph_id))
}
