use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, GenericArgument, Ident, ItemFn, Pat, PathArguments,
    Signature, Type,
};

/// Transform an asynchronous test into a synchronous one, inject dependencies,
/// and ensure that the database is cleared regardless of how the test terminates.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`],
/// [`mongodb::Database`], [`rocket::http::Header<'static>`] (the `Authorization` header
/// of the logged-in user, if any) and [`crate::model::mongodb::Coll<T>`].
///
/// Pass `admin` or `voter` to log in as an example user of that role first.
/// Tests need a MongoDB instance at the configured `db_uri`, so they are
/// ignored unless run with `--ignored`.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let (test_args, collection_idents, collection_types) = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in as admin/voter if needed, keeping the bearer header for the test.
    let maybe_login = parse_macro_input!(args as Option<Ident>)
        .and_then(|arg| {
            let (user, password) = if arg == "admin" {
                (
                    quote! { crate::model::db::user::NewUser::admin_example() },
                    quote! { crate::model::db::user::EXAMPLE_ADMIN_PASSWORD },
                )
            } else if arg == "voter" {
                (
                    quote! { crate::model::db::user::NewUser::voter_example(0) },
                    quote! { crate::model::db::user::EXAMPLE_VOTER_PASSWORD },
                )
            } else {
                return None;
            };
            Some(quote! {
                let user = #user;
                crate::model::mongodb::Coll::<crate::model::db::user::NewUser>::from_db(&db)
                    .insert_one(&user, None)
                    .await
                    .unwrap();

                let response = rocket_client
                    .post("/api/auth/login")
                    .header(rocket::http::ContentType::JSON)
                    .body(rocket::serde::json::json!({
                        "email": user.email,
                        "password": #password,
                    }).to_string())
                    .dispatch()
                    .await;
                let login: crate::model::api::auth::LoginResponse =
                    response.into_json().await.unwrap();
                auth = rocket::http::Header::new(
                    "Authorization",
                    format!("Bearer {}", login.token),
                );
            })
        })
        .unwrap_or_default();

    // Rewrite the test function.
    quote! {
        #[test]
        #[ignore = "requires a running MongoDB instance"]
        fn #name() {
            /// Test setup.
            async fn setup() -> (
                rocket::local::asynchronous::Client,
                mongodb::Database,
                rocket::http::Header<'static>,
            ) {
                let db_client = crate::db_client().await;
                let db_name = crate::database();
                let rocket_client = rocket::local::asynchronous::Client::tracked(
                    crate::rocket_for_db(db_client.clone(), &db_name).await,
                )
                .await
                .unwrap();
                let db = db_client.database(&db_name);
                #[allow(unused_mut, unused_assignments)]
                let mut auth = rocket::http::Header::new("Authorization", "");

                #maybe_login

                (rocket_client, db, auth)
            }

            /// The test itself.
            #item_fn

            /// Test cleanup.
            async fn cleanup(db: mongodb::Database) {
                db.drop(None).await.unwrap();
            }

            // Create an async runtime. We need a separate one for inside and
            // outside the `catch_unwind`.
            let outer_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-setup-cleanup")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let inner_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            #[allow(unused_variables)]
            let (rocket_client, db, auth) = outer_runtime.block_on(setup());

            // Run the test, catching any panics.
            // Use mutexes to safely transfer `!UnwindSafe` data.
            let client_mutex = std::sync::Mutex::new(rocket_client);
            let db_mutex = std::sync::Mutex::new(db.clone());
            let runtime_mutex = std::sync::Mutex::new(inner_runtime);
            let result = std::panic::catch_unwind(|| {
                let rocket_client = client_mutex.into_inner().unwrap();
                let db = db_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();

                #(
                    let #collection_idents = crate::model::mongodb::Coll::<#collection_types>::from_db(&db);
                )*

                runtime.block_on(#new_name(#(#test_args),* #(,#collection_idents)*));
            });

            // Run the cleanup.
            outer_runtime.block_on(cleanup(db));

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::panic_any(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
#[allow(clippy::type_complexity)]
fn check_sig(sig: Signature) -> Result<(Vec<TokenStream2>, Vec<Ident>, Vec<Ident>), syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_db = false;
    let mut has_auth = false;
    let mut args = vec![];
    let mut collection_idents = vec![];
    let mut collection_types = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(pat_ident) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    // `Header<'static>` carries a lifetime, so match on its last segment.
                    let last_segment = type_path.path.segments.last();
                    if last_segment.map_or(false, |segment| segment.ident == "Header") {
                        if has_auth {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one auth `Header`",
                            ));
                        }
                        has_auth = true;
                        args.push(quote! { auth.clone() });
                        continue;
                    }
                    if let Some(type_ident) = type_path.path.get_ident() {
                        if type_ident == "Client" {
                            if has_client {
                                return Err(syn::Error::new(input.span(), "Test cannot accept more than one `rocket::local::asynchronous::Client`"));
                            }
                            has_client = true;
                            args.push(quote! { rocket_client });
                            continue;
                        } else if type_ident == "Database" {
                            if has_db {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `mongodb::Database`",
                                ));
                            }
                            has_db = true;
                            args.push(quote! { db });
                            continue;
                        }
                    } else {
                        // Valid as the last path segment for any type is itself
                        let possible_collection = type_path.path.segments.last().unwrap();
                        if possible_collection.ident == "Coll" {
                            if let PathArguments::AngleBracketed(generics) =
                                &possible_collection.arguments
                            {
                                if let Some(GenericArgument::Type(Type::Path(type_path))) =
                                    generics.args.first()
                                {
                                    if let Some(type_ident) = type_path.path.get_ident() {
                                        collection_idents.push(pat_ident.ident.clone());
                                        collection_types.push(type_ident.clone());
                                        continue;
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client`, `db_ident: Database`, `auth_ident: Header<'static>` or `collection_ident: Coll<T>`",
        ));
    }

    Ok((args, collection_idents, collection_types))
}
