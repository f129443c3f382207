//! Function-call visitor for the policy checker.
//!
//! Walks every clause position of a statement (projection, WHERE, HAVING,
//! GROUP BY, ORDER BY, JOIN ON, derived tables, table-valued functions, CTE
//! bodies and expression subqueries) and reports the name of each function
//! call it finds. Node shapes it does not inspect fall through the catch-all
//! arms and are ignored.

use sqlparser::ast::*;

/// Visits all function calls in a statement, calling `visitor` with each
/// function name.
pub fn visit_function_calls<F: FnMut(&ObjectName)>(stmt: &Statement, visitor: &mut F) {
    match stmt {
        Statement::Query(q) => visit_query(q, visitor),
        Statement::Insert(ins) => {
            if let Some(ref source) = ins.source {
                visit_query(source, visitor);
            }
            for assignment in &ins.assignments {
                visit_expr(&assignment.value, visitor);
            }
        }
        Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => {
            visit_table_with_joins(table, visitor);
            for assignment in assignments {
                visit_expr(&assignment.value, visitor);
            }
            if let Some(selection) = selection {
                visit_expr(selection, visitor);
            }
        }
        Statement::Delete(delete) => {
            if let Some(selection) = &delete.selection {
                visit_expr(selection, visitor);
            }
        }
        Statement::CreateView { query, .. } => visit_query(query, visitor),
        Statement::CreateTable(create) => {
            if let Some(ref q) = create.query {
                visit_query(q, visitor);
            }
        }
        _ => {}
    }
}

fn visit_query<F: FnMut(&ObjectName)>(query: &Query, visitor: &mut F) {
    if let Some(ref with) = query.with {
        for cte in &with.cte_tables {
            visit_query(&cte.query, visitor);
        }
    }
    visit_set_expr(&query.body, visitor);

    if let Some(ref order_by) = query.order_by {
        if let OrderByKind::Expressions(exprs) = &order_by.kind {
            for order_expr in exprs {
                visit_expr(&order_expr.expr, visitor);
            }
        }
    }
}

fn visit_set_expr<F: FnMut(&ObjectName)>(body: &SetExpr, visitor: &mut F) {
    match body {
        SetExpr::Select(select) => {
            for item in &select.projection {
                if let SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } = item
                {
                    visit_expr(expr, visitor);
                }
            }
            for table_with_joins in &select.from {
                visit_table_with_joins(table_with_joins, visitor);
            }
            if let Some(ref selection) = select.selection {
                visit_expr(selection, visitor);
            }
            if let GroupByExpr::Expressions(exprs, _) = &select.group_by {
                for expr in exprs {
                    visit_expr(expr, visitor);
                }
            }
            if let Some(ref having) = select.having {
                visit_expr(having, visitor);
            }
        }
        SetExpr::Query(q) => visit_query(q, visitor),
        SetExpr::SetOperation { left, right, .. } => {
            visit_set_expr(left, visitor);
            visit_set_expr(right, visitor);
        }
        SetExpr::Values(values) => {
            for row in &values.rows {
                for expr in row {
                    visit_expr(expr, visitor);
                }
            }
        }
        SetExpr::Insert(statement) | SetExpr::Update(statement) | SetExpr::Delete(statement) => {
            visit_function_calls(statement, visitor)
        }
        _ => {}
    }
}

fn visit_expr<F: FnMut(&ObjectName)>(expr: &Expr, visitor: &mut F) {
    match expr {
        Expr::Function(func) => {
            visitor(&func.name);
            match &func.args {
                FunctionArguments::Subquery(query) => visit_query(query, visitor),
                FunctionArguments::List(arg_list) => visit_function_args(&arg_list.args, visitor),
                FunctionArguments::None => {}
            }
            if let Some(filter) = &func.filter {
                visit_expr(filter, visitor);
            }
            for order_expr in &func.within_group {
                visit_expr(&order_expr.expr, visitor);
            }
            if let Some(WindowType::WindowSpec(spec)) = &func.over {
                for expr in &spec.partition_by {
                    visit_expr(expr, visitor);
                }
                for order_expr in &spec.order_by {
                    visit_expr(&order_expr.expr, visitor);
                }
            }
        }
        Expr::BinaryOp { left, right, .. }
        | Expr::AnyOp { left, right, .. }
        | Expr::AllOp { left, right, .. } => {
            visit_expr(left, visitor);
            visit_expr(right, visitor);
        }
        Expr::IsDistinctFrom(left, right) | Expr::IsNotDistinctFrom(left, right) => {
            visit_expr(left, visitor);
            visit_expr(right, visitor);
        }
        Expr::UnaryOp { expr: inner, .. }
        | Expr::Nested(inner)
        | Expr::Extract { expr: inner, .. }
        | Expr::Ceil { expr: inner, .. }
        | Expr::Floor { expr: inner, .. }
        | Expr::Collate { expr: inner, .. } => visit_expr(inner, visitor),
        Expr::AtTimeZone {
            timestamp,
            time_zone,
        } => {
            visit_expr(timestamp, visitor);
            visit_expr(time_zone, visitor);
        }
        Expr::Position { expr, r#in } => {
            visit_expr(expr, visitor);
            visit_expr(r#in, visitor);
        }
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => {
            visit_expr(expr, visitor);
            for part in [substring_from, substring_for].into_iter().flatten() {
                visit_expr(part, visitor);
            }
        }
        Expr::Trim {
            expr,
            trim_what,
            trim_characters,
            ..
        } => {
            visit_expr(expr, visitor);
            if let Some(what) = trim_what {
                visit_expr(what, visitor);
            }
            for ch in trim_characters.iter().flatten() {
                visit_expr(ch, visitor);
            }
        }
        Expr::Overlay {
            expr,
            overlay_what,
            overlay_from,
            overlay_for,
        } => {
            visit_expr(expr, visitor);
            visit_expr(overlay_what, visitor);
            visit_expr(overlay_from, visitor);
            if let Some(overlay_for) = overlay_for {
                visit_expr(overlay_for, visitor);
            }
        }
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            if let Some(op) = operand {
                visit_expr(op, visitor);
            }
            for case_when in conditions {
                visit_expr(&case_when.condition, visitor);
                visit_expr(&case_when.result, visitor);
            }
            if let Some(el) = else_result {
                visit_expr(el, visitor);
            }
        }
        Expr::Cast { expr: inner, .. } | Expr::Convert { expr: inner, .. } => {
            visit_expr(inner, visitor)
        }
        Expr::InSubquery {
            expr: inner,
            subquery,
            ..
        } => {
            visit_expr(inner, visitor);
            visit_query(subquery, visitor);
        }
        Expr::Subquery(subquery) | Expr::Exists { subquery, .. } => visit_query(subquery, visitor),
        Expr::Between {
            expr, low, high, ..
        } => {
            visit_expr(expr, visitor);
            visit_expr(low, visitor);
            visit_expr(high, visitor);
        }
        Expr::Like { expr, pattern, .. }
        | Expr::ILike { expr, pattern, .. }
        | Expr::SimilarTo { expr, pattern, .. } => {
            visit_expr(expr, visitor);
            visit_expr(pattern, visitor);
        }
        Expr::IsNull(inner) | Expr::IsNotNull(inner) => visit_expr(inner, visitor),
        Expr::InList { expr, list, .. } => {
            visit_expr(expr, visitor);
            for item in list {
                visit_expr(item, visitor);
            }
        }
        Expr::Tuple(items) => {
            for item in items {
                visit_expr(item, visitor);
            }
        }
        _ => {}
    }
}

fn visit_function_args<F: FnMut(&ObjectName)>(args: &[FunctionArg], visitor: &mut F) {
    for arg in args {
        match arg {
            FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))
            | FunctionArg::Named {
                arg: FunctionArgExpr::Expr(expr),
                ..
            } => visit_expr(expr, visitor),
            FunctionArg::ExprNamed { name, arg, .. } => {
                visit_expr(name, visitor);
                if let FunctionArgExpr::Expr(expr) = arg {
                    visit_expr(expr, visitor);
                }
            }
            _ => {}
        }
    }
}

fn visit_join_constraint<F: FnMut(&ObjectName)>(op: &JoinOperator, visitor: &mut F) {
    let constraint = match op {
        JoinOperator::Join(c)
        | JoinOperator::Inner(c)
        | JoinOperator::Left(c)
        | JoinOperator::LeftOuter(c)
        | JoinOperator::Right(c)
        | JoinOperator::RightOuter(c)
        | JoinOperator::FullOuter(c)
        | JoinOperator::CrossJoin(c)
        | JoinOperator::Semi(c)
        | JoinOperator::LeftSemi(c)
        | JoinOperator::RightSemi(c)
        | JoinOperator::Anti(c)
        | JoinOperator::LeftAnti(c)
        | JoinOperator::RightAnti(c)
        | JoinOperator::StraightJoin(c) => c,
        JoinOperator::AsOf { constraint, .. } => constraint,
        JoinOperator::CrossApply | JoinOperator::OuterApply => return,
    };
    if let JoinConstraint::On(expr) = constraint {
        visit_expr(expr, visitor);
    }
}

fn visit_table_with_joins<F: FnMut(&ObjectName)>(table: &TableWithJoins, visitor: &mut F) {
    visit_table_factor(&table.relation, visitor);
    for join in &table.joins {
        visit_table_factor(&join.relation, visitor);
        visit_join_constraint(&join.join_operator, visitor);
    }
}

fn visit_table_factor<F: FnMut(&ObjectName)>(table_factor: &TableFactor, visitor: &mut F) {
    match table_factor {
        TableFactor::Table {
            name,
            args: Some(table_args),
            ..
        } => {
            visitor(name);
            visit_function_args(&table_args.args, visitor);
        }
        TableFactor::Derived { subquery, .. } => visit_query(subquery, visitor),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => visit_table_with_joins(table_with_joins, visitor),
        TableFactor::Pivot { table, .. } | TableFactor::Unpivot { table, .. } => {
            visit_table_factor(table, visitor)
        }
        _ => {}
    }
}
