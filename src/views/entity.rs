use anyhow::anyhow;
use askama::Template;
use askama_web::WebTemplate;
use futures_util::future::join_all;
use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{get, post, State};
use serde_json::Value;

use crate::client::ApiClient;
use crate::entities::{with_entity_type, Entity, EntityId, Field, Kind};
use crate::error::{RedirectTo, Result, WithContext};
use crate::slice::EntitySlice;
use crate::views::display::{self, Row};
use crate::views::form::{self, FieldErrors, FormInput, FormValues, References};
use crate::{Context, TplContext};

#[derive(Template, WebTemplate)]
#[template(path = "entity/list.html")]
struct ListTpl<'a> {
    base: TplContext<'a>,
    kind: Kind,
    fields: &'static [Field],
    rows: Vec<Row>,
    loading: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "entity/detail.html")]
struct DetailTpl<'a> {
    base: TplContext<'a>,
    kind: Kind,
    row: Row,
}

#[derive(Template, WebTemplate)]
#[template(path = "entity/form.html")]
struct FormTpl<'a> {
    base: TplContext<'a>,
    kind: Kind,
    id: Option<EntityId>,
    action: String,
    inputs: Vec<FormInput>,
}

#[derive(Template, WebTemplate)]
#[template(path = "entity/delete.html")]
struct DeleteTpl<'a> {
    base: TplContext<'a>,
    kind: Kind,
    id: EntityId,
}

#[derive(rocket::Responder)]
enum FormResponse<'a> {
    Saved(Flash<Redirect>),
    Invalid(FormTpl<'a>),
}

#[derive(rocket::Responder)]
enum DeleteResponse<'a> {
    Deleted(Flash<Redirect>),
    Failed(DeleteTpl<'a>),
}

struct ListPage {
    rows: Vec<Row>,
    loading: bool,
    error_message: Option<String>,
}

enum SaveOutcome {
    Saved(Option<EntityId>),
    Invalid {
        error_message: Option<String>,
        errors: FieldErrors,
    },
}

fn list_url(kind: Kind) -> String {
    format!("/{}", kind.slug())
}

async fn load_list<T: Entity>(client: &ApiClient) -> Result<ListPage> {
    let mut slice = EntitySlice::<T>::new(client);
    let state = slice.get_entities().await;

    let rows = state
        .entities
        .iter()
        .map(|entity| Ok(display::row(T::FIELDS, &serde_json::to_value(entity)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ListPage {
        rows,
        loading: state.loading,
        error_message: state.error_message.clone(),
    })
}

async fn load_entity<T: Entity>(client: &ApiClient, id: EntityId) -> Result<Value> {
    let mut slice = EntitySlice::<T>::new(client);
    let state = slice.get_entity(id).await;

    if let Some(error_message) = &state.error_message {
        let failed: Result<Value> = Err(anyhow!(error_message.clone()).into());
        return failed.context(format!("Failed to load {} {}", T::KIND.title(), id));
    }

    Ok(serde_json::to_value(&state.entity)?)
}

/// Fetches every collection `kind`'s form picks relationships from, all at
/// once. A collection that fails to load is left empty and reported.
async fn load_references(client: &ApiClient, kind: Kind) -> (References, Vec<String>) {
    let kinds = kind.references();
    let results = join_all(kinds.iter().map(|kind| client.list_references(*kind))).await;

    let mut references = References::new();
    let mut errors = vec![];
    for (kind, result) in kinds.into_iter().zip(results) {
        match result {
            Ok(collection) => {
                references.insert(kind, collection);
            }
            Err(e) => {
                errors.push(format!("Failed to load {}: {}", kind.plural_title(), e));
                references.insert(kind, vec![]);
            }
        }
    }

    (references, errors)
}

async fn save<T: Entity>(
    client: &ApiClient,
    base: Value,
    values: &FormValues,
    references: &References,
) -> SaveOutcome {
    let merged = match form::merge(T::FIELDS, base, values, references) {
        Ok(merged) => merged,
        Err(errors) => {
            return SaveOutcome::Invalid {
                error_message: None,
                errors,
            }
        }
    };

    let entity = match serde_json::from_value::<T>(merged) {
        Ok(entity) => entity,
        Err(e) => {
            return SaveOutcome::Invalid {
                error_message: Some(e.to_string()),
                errors: FieldErrors::new(),
            }
        }
    };

    let mut slice = EntitySlice::<T>::new(client);
    let state = if entity.id().is_some() {
        slice.update_entity(&entity).await
    } else {
        slice.create_entity(&entity).await
    };

    if state.update_success {
        SaveOutcome::Saved(state.entity.id())
    } else {
        SaveOutcome::Invalid {
            error_message: state.error_message.clone(),
            errors: FieldErrors::new(),
        }
    }
}

async fn remove<T: Entity>(client: &ApiClient, id: EntityId) -> Option<String> {
    let mut slice = EntitySlice::<T>::new(client);
    let state = slice.delete_entity(id).await;

    if state.update_success {
        None
    } else {
        state.error_message.clone()
    }
}

#[get("/<kind>")]
#[tracing::instrument(skip(ctx, flash))]
async fn list<'a>(
    kind: Kind,
    flash: Option<FlashMessage<'_>>,
    ctx: &State<Context>,
) -> Result<ListTpl<'a>> {
    let page = with_entity_type!(kind, T => load_list::<T>(ctx.client()).await)?;

    Ok(ListTpl {
        base: TplContext::from_flash(kind.slug(), flash).with_error(page.error_message),
        kind,
        fields: kind.fields(),
        rows: page.rows,
        loading: page.loading,
    })
}

#[get("/<kind>/<id>", rank = 2)]
#[tracing::instrument(skip(redirect_to, ctx, flash))]
async fn detail<'a>(
    redirect_to: &RedirectTo,
    kind: Kind,
    id: EntityId,
    flash: Option<FlashMessage<'_>>,
    ctx: &State<Context>,
) -> Result<DetailTpl<'a>> {
    redirect_to.set(&list_url(kind));

    let entity = with_entity_type!(kind, T => load_entity::<T>(ctx.client(), id).await)?;

    Ok(DetailTpl {
        base: TplContext::from_flash(kind.slug(), flash),
        kind,
        row: display::row(kind.fields(), &entity),
    })
}

#[get("/<kind>/new", rank = 1)]
#[tracing::instrument(skip(ctx, flash))]
async fn new_form<'a>(
    kind: Kind,
    flash: Option<FlashMessage<'_>>,
    ctx: &State<Context>,
) -> FormTpl<'a> {
    let (references, errors) = load_references(ctx.client(), kind).await;
    let values = form::default_values(kind.fields());

    let mut base = TplContext::from_flash(kind.slug(), flash);
    base.err_msg.extend(errors);

    FormTpl {
        base,
        kind,
        id: None,
        action: format!("/{}/new", kind.slug()),
        inputs: form::inputs(kind.fields(), &values, &references, &FieldErrors::new()),
    }
}

#[post("/<kind>/new", data = "<values>", rank = 1)]
#[tracing::instrument(skip(ctx, values))]
async fn create<'a>(
    kind: Kind,
    values: Form<FormValues>,
    ctx: &State<Context>,
) -> FormResponse<'a> {
    let (references, errors) = load_references(ctx.client(), kind).await;
    let outcome = with_entity_type!(kind, T => {
        save::<T>(ctx.client(), Value::Object(Default::default()), &values, &references).await
    });

    match outcome {
        SaveOutcome::Saved(id) => FormResponse::Saved(Flash::success(
            Redirect::to(list_url(kind)),
            format!(
                "A new {} is created with identifier {}",
                kind.title(),
                id.map(|id| id.to_string()).unwrap_or_default()
            ),
        )),
        SaveOutcome::Invalid {
            error_message,
            errors: field_errors,
        } => {
            let mut base = TplContext::from_flash(kind.slug(), None).with_error(error_message);
            base.err_msg.extend(errors);

            FormResponse::Invalid(FormTpl {
                base,
                kind,
                id: None,
                action: format!("/{}/new", kind.slug()),
                inputs: form::inputs(kind.fields(), &values, &references, &field_errors),
            })
        }
    }
}

#[get("/<kind>/<id>/edit", rank = 1)]
#[tracing::instrument(skip(redirect_to, ctx, flash))]
async fn edit_form<'a>(
    redirect_to: &RedirectTo,
    kind: Kind,
    id: EntityId,
    flash: Option<FlashMessage<'_>>,
    ctx: &State<Context>,
) -> Result<FormTpl<'a>> {
    redirect_to.set(&list_url(kind));

    let entity_fut = async {
        with_entity_type!(kind, T => load_entity::<T>(ctx.client(), id).await)
    };
    let (entity, (references, errors)) =
        futures_util::join!(entity_fut, load_references(ctx.client(), kind));
    let entity = entity?;

    let values = form::values_from_entity(kind.fields(), &entity);
    let mut base = TplContext::from_flash(kind.slug(), flash);
    base.err_msg.extend(errors);

    Ok(FormTpl {
        base,
        kind,
        id: Some(id),
        action: format!("/{}/{}/edit", kind.slug(), id),
        inputs: form::inputs(kind.fields(), &values, &references, &FieldErrors::new()),
    })
}

#[post("/<kind>/<id>/edit", data = "<values>", rank = 1)]
#[tracing::instrument(skip(redirect_to, ctx, values))]
async fn update<'a>(
    redirect_to: &RedirectTo,
    kind: Kind,
    id: EntityId,
    values: Form<FormValues>,
    ctx: &State<Context>,
) -> Result<FormResponse<'a>> {
    redirect_to.set(&list_url(kind));

    let (references, errors) = load_references(ctx.client(), kind).await;
    let outcome = with_entity_type!(kind, T => {
        let mut base = load_entity::<T>(ctx.client(), id).await?;
        base["id"] = serde_json::to_value(id)?;
        save::<T>(ctx.client(), base, &values, &references).await
    });

    Ok(match outcome {
        SaveOutcome::Saved(_) => FormResponse::Saved(Flash::success(
            Redirect::to(list_url(kind)),
            format!("A {} is updated with identifier {}", kind.title(), id),
        )),
        SaveOutcome::Invalid {
            error_message,
            errors: field_errors,
        } => {
            let mut base = TplContext::from_flash(kind.slug(), None).with_error(error_message);
            base.err_msg.extend(errors);

            FormResponse::Invalid(FormTpl {
                base,
                kind,
                id: Some(id),
                action: format!("/{}/{}/edit", kind.slug(), id),
                inputs: form::inputs(kind.fields(), &values, &references, &field_errors),
            })
        }
    })
}

#[get("/<kind>/<id>/delete", rank = 1)]
#[tracing::instrument(skip(redirect_to, ctx, flash))]
async fn delete_dialog<'a>(
    redirect_to: &RedirectTo,
    kind: Kind,
    id: EntityId,
    flash: Option<FlashMessage<'_>>,
    ctx: &State<Context>,
) -> Result<DeleteTpl<'a>> {
    redirect_to.set(&list_url(kind));

    with_entity_type!(kind, T => load_entity::<T>(ctx.client(), id).await)?;

    Ok(DeleteTpl {
        base: TplContext::from_flash(kind.slug(), flash),
        kind,
        id,
    })
}

#[post("/<kind>/<id>/delete", rank = 1)]
#[tracing::instrument(skip(ctx))]
async fn delete<'a>(kind: Kind, id: EntityId, ctx: &State<Context>) -> DeleteResponse<'a> {
    let error_message = with_entity_type!(kind, T => remove::<T>(ctx.client(), id).await);

    match error_message {
        None => DeleteResponse::Deleted(Flash::success(
            Redirect::to(list_url(kind)),
            format!("A {} is deleted with identifier {}", kind.title(), id),
        )),
        Some(error_message) => DeleteResponse::Failed(DeleteTpl {
            base: TplContext::from_flash(kind.slug(), None).with_error(Some(error_message)),
            kind,
            id,
        }),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    rocket::routes![
        list,
        detail,
        new_form,
        create,
        edit_form,
        update,
        delete_dialog,
        delete
    ]
}
