//! 商品管理页
//!
//! 列表按分类分组展示；创建走两阶段提交（先上传图片换持久 URL，
//! 再携带持久 URL 创建）；价格/库存行内编辑、上架开关与删除
//! 之后整体重拉列表（删除在本地先行移除）。

mod form_state;

use crate::auth::{self, use_api};
use crate::components::icons::{Plus, RefreshCw, Trash2};
use crate::components::toast::use_toast;
use crate::upload::PreviewUrls;
use astro_shared::Product;
use form_state::{EditDraft, FormState};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use wasm_bindgen::JsCast;
use web_sys::FormData;

/// 按首次出现的顺序取出所有分类
fn unique_categories(products: &[Product]) -> Vec<String> {
    let mut categories = Vec::new();
    for product in products {
        if !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}

#[component]
pub fn ProductsPage() -> impl IntoView {
    let api = use_api();
    let navigate = use_navigate();
    let toaster = use_toast();

    let (products, set_products) = signal(Vec::<Product>::new());
    let (loading, set_loading) = signal(true);
    let (show_form, set_show_form) = signal(false);
    let (is_submitting, set_is_submitting) = signal(false);

    let form = FormState::new();
    let preview = RwSignal::new(PreviewUrls::new());
    // 行内编辑（价格/库存）的草稿，同一时刻最多一个
    let editing = RwSignal::new(Option::<EditDraft>::None);

    let load_products = {
        let api = api.clone();
        move || {
            let api = api.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.fetch_products().await {
                    Ok(data) => set_products.set(data),
                    Err(err) => {
                        web_sys::console::error_1(
                            &format!("[Products] fetch failed: {err}").into(),
                        );
                        toaster.error("加载商品失败");
                    }
                }
                set_loading.set(false);
            });
        }
    };

    // 导航守卫：激活时检查一次 token，缺失则跳转登录页且不发起请求
    Effect::new({
        let api = api.clone();
        let navigate = navigate.clone();
        let load_products = load_products.clone();
        move |_| {
            if !auth::guard(&api, &navigate) {
                return;
            }
            load_products();
        }
    });

    // 选择文件：替换预览集，旧的 object URL 全部回收
    let on_files_selected = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(list) = input.files() else {
            return;
        };
        let files: Vec<web_sys::File> = (0..list.length()).filter_map(|i| list.get(i)).collect();
        preview.update(|p| p.replace(&files));
        form.files.set(files);
    };

    // 两阶段提交：上传 -> 创建；创建请求只携带持久 URL
    let on_submit = {
        let api = api.clone();
        let load_products = load_products.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();

            // 校验在输入层完成，失败不发任何请求
            let draft = match form.draft() {
                Ok(draft) => draft,
                Err(message) => {
                    toaster.error(message);
                    return;
                }
            };

            set_is_submitting.set(true);
            let api = api.clone();
            let load_products = load_products.clone();
            spawn_local(async move {
                let files = form.files.get_untracked();
                let images = if files.is_empty() {
                    Vec::new()
                } else {
                    let Ok(form_data) = FormData::new() else {
                        toaster.error("构建上传请求失败");
                        set_is_submitting.set(false);
                        return;
                    };
                    for file in &files {
                        let _ = form_data.append_with_blob("files", file);
                    }
                    match api.upload_product_images(form_data).await {
                        Ok(response) => response.urls,
                        Err(err) => {
                            web_sys::console::error_1(
                                &format!("[Products] upload failed: {err}").into(),
                            );
                            toaster.error(
                                err.server_message()
                                    .unwrap_or_else(|| "上传图片失败".to_string()),
                            );
                            set_is_submitting.set(false);
                            return;
                        }
                    }
                };

                match api.create_product(&draft.into_request(images)).await {
                    Ok(_) => {
                        // 提交成功：释放本地预览 URL
                        preview.update(|p| p.release());
                        toaster.success("商品创建成功");
                        set_show_form.set(false);
                        form.reset();
                        load_products();
                    }
                    Err(err) => {
                        web_sys::console::error_1(
                            &format!("[Products] create failed: {err}").into(),
                        );
                        toaster.error(
                            err.server_message()
                                .unwrap_or_else(|| "创建商品失败".to_string()),
                        );
                    }
                }
                set_is_submitting.set(false);
            });
        }
    };

    let on_toggle = Callback::new({
        let api = api.clone();
        let load_products = load_products.clone();
        move |product_id: u64| {
            let api = api.clone();
            let load_products = load_products.clone();
            spawn_local(async move {
                match api.toggle_product(product_id).await {
                    Ok(_) => {
                        toaster.success("商品状态已更新");
                        load_products();
                    }
                    Err(err) => {
                        web_sys::console::error_1(
                            &format!("[Products] toggle failed: {err}").into(),
                        );
                        toaster.error(
                            err.server_message()
                                .unwrap_or_else(|| "更新商品状态失败".to_string()),
                        );
                    }
                }
            });
        }
    });

    let on_delete = Callback::new({
        let api = api.clone();
        move |product_id: u64| {
            let confirmed = web_sys::window()
                .map(|w| {
                    w.confirm_with_message("确定要删除该商品吗？")
                        .unwrap_or(false)
                })
                .unwrap_or(false);
            if !confirmed {
                return;
            }

            let api = api.clone();
            spawn_local(async move {
                match api.delete_product(product_id).await {
                    Ok(response) => {
                        toaster.success(
                            response.message.unwrap_or_else(|| "商品已删除".to_string()),
                        );
                        // 本地先行移除，无需整体重拉
                        set_products.update(|list| list.retain(|p| p.id != product_id));
                    }
                    Err(err) => {
                        web_sys::console::error_1(
                            &format!("[Products] delete failed: {err}").into(),
                        );
                        toaster.error(
                            err.server_message()
                                .unwrap_or_else(|| "删除商品失败".to_string()),
                        );
                    }
                }
            });
        }
    });

    let on_save_edit = Callback::new({
        let api = api.clone();
        let load_products = load_products.clone();
        move |()| {
            let Some(draft) = editing.get_untracked() else {
                return;
            };
            let request = match draft.to_request() {
                Ok(request) => request,
                Err(message) => {
                    toaster.error(message);
                    return;
                }
            };

            let api = api.clone();
            let load_products = load_products.clone();
            spawn_local(async move {
                match api.edit_product(draft.id, &request).await {
                    Ok(_) => {
                        toaster.success("商品已更新");
                        editing.set(None);
                        load_products();
                    }
                    Err(err) => {
                        web_sys::console::error_1(
                            &format!("[Products] edit failed: {err}").into(),
                        );
                        toaster.error(
                            err.server_message()
                                .unwrap_or_else(|| "更新商品失败".to_string()),
                        );
                    }
                }
            });
        }
    });

    let on_refresh = {
        let load_products = load_products.clone();
        move |_| load_products()
    };

    view! {
        <div class="max-w-7xl mx-auto space-y-6">
            <div class="flex items-center justify-between">
                <h1 class="text-3xl font-bold">"商品管理"</h1>
                <div class="flex items-center gap-2">
                    <button
                        on:click=on_refresh
                        disabled=move || loading.get()
                        class="btn btn-ghost btn-circle"
                    >
                        <RefreshCw attr:class=move || {
                            if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" }
                        } />
                    </button>
                    <button
                        on:click=move |_| set_show_form.update(|open| *open = !*open)
                        class="btn btn-primary gap-2"
                    >
                        <Plus attr:class="h-4 w-4" />
                        {move || if show_form.get() { "取消" } else { "添加商品" }}
                    </button>
                </div>
            </div>

            <Show when=move || show_form.get()>
                <div class="card bg-base-100 shadow-xl">
                    <form class="card-body space-y-2" on:submit=on_submit.clone()>
                        <h2 class="card-title">"添加新商品"</h2>

                        <div class="form-control">
                            <label for="product-name" class="label">
                                <span class="label-text">"名称"</span>
                            </label>
                            <input
                                id="product-name"
                                type="text"
                                required
                                on:input=move |ev| form.name.set(event_target_value(&ev))
                                prop:value=form.name
                                class="input input-bordered w-full"
                            />
                        </div>

                        <div class="form-control">
                            <label for="product-description" class="label">
                                <span class="label-text">"描述"</span>
                            </label>
                            <textarea
                                id="product-description"
                                required
                                on:input=move |ev| form.description.set(event_target_value(&ev))
                                prop:value=form.description
                                class="textarea textarea-bordered w-full"
                            ></textarea>
                        </div>

                        <div class="grid grid-cols-2 gap-4">
                            <div class="form-control">
                                <label for="product-price" class="label">
                                    <span class="label-text">"价格"</span>
                                </label>
                                <input
                                    id="product-price"
                                    type="number"
                                    step="0.01"
                                    min="0"
                                    required
                                    on:input=move |ev| form.price.set(event_target_value(&ev))
                                    prop:value=form.price
                                    class="input input-bordered w-full"
                                />
                            </div>
                            <div class="form-control">
                                <label for="product-stock" class="label">
                                    <span class="label-text">"库存"</span>
                                </label>
                                <input
                                    id="product-stock"
                                    type="number"
                                    min="0"
                                    required
                                    on:input=move |ev| form.stock.set(event_target_value(&ev))
                                    prop:value=form.stock
                                    class="input input-bordered w-full"
                                />
                            </div>
                        </div>

                        <div class="form-control">
                            <label for="product-category" class="label">
                                <span class="label-text">"分类"</span>
                            </label>
                            <input
                                id="product-category"
                                type="text"
                                required
                                on:input=move |ev| form.category.set(event_target_value(&ev))
                                prop:value=form.category
                                class="input input-bordered w-full"
                            />
                        </div>

                        <div class="form-control">
                            <label for="product-images" class="label">
                                <span class="label-text">"图片"</span>
                            </label>
                            <input
                                id="product-images"
                                type="file"
                                multiple
                                accept="image/*"
                                on:change=on_files_selected
                                class="file-input file-input-bordered w-full"
                            />
                            // 本地预览（临时 object URL，提交成功后回收）
                            <div class="mt-2 grid grid-cols-4 gap-2">
                                {move || {
                                    preview
                                        .with(|p| p.urls().to_vec())
                                        .into_iter()
                                        .map(|url| view! {
                                            <img src=url class="w-full h-24 object-cover rounded" />
                                        })
                                        .collect_view()
                                }}
                            </div>
                        </div>

                        <div class="form-control mt-4">
                            <button
                                type="submit"
                                disabled=move || is_submitting.get()
                                class="btn btn-primary w-full"
                            >
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "创建中..." }.into_any()
                                } else {
                                    "创建商品".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </Show>

            <Show when=move || loading.get() && products.with(|list| list.is_empty())>
                <div class="text-center py-8 text-base-content/50">
                    <span class="loading loading-spinner loading-md"></span>
                    " 加载中..."
                </div>
            </Show>
            <Show when=move || !loading.get() && products.with(|list| list.is_empty())>
                <div class="card bg-base-100 shadow">
                    <div class="card-body text-center text-base-content/50">
                        "暂无商品。添加一个以开始。"
                    </div>
                </div>
            </Show>

            {move || {
                let all = products.get();
                unique_categories(&all)
                    .into_iter()
                    .map(|category| {
                        let items: Vec<Product> = all
                            .iter()
                            .filter(|p| p.category == category)
                            .cloned()
                            .collect();
                        view! {
                            <div class="space-y-4">
                                <h2 class="text-2xl font-bold border-b border-base-300 pb-2">
                                    {category.clone()}
                                </h2>
                                <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-6">
                                    {items
                                        .into_iter()
                                        .map(|product| view! {
                                            <ProductCard
                                                product=product
                                                editing=editing
                                                on_toggle=on_toggle
                                                on_delete=on_delete
                                                on_save=on_save_edit
                                            />
                                        })
                                        .collect_view()}
                                </div>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[component]
fn ProductCard(
    product: Product,
    editing: RwSignal<Option<EditDraft>>,
    on_toggle: Callback<u64>,
    on_delete: Callback<u64>,
    on_save: Callback<()>,
) -> impl IntoView {
    let product_id = product.id;
    let is_active = product.is_active;
    let price = product.price;
    let stock = product.stock;
    let display_price = product.display_price();
    let has_discount = product.discount_price.is_some();
    let first_image = product.images.first().cloned();
    let name = product.name.clone();
    let description = product.description.clone();

    let is_editing = move || {
        editing
            .with(|draft| draft.as_ref().map(|d| d.id == product_id))
            .unwrap_or(false)
    };

    let badge_class = if is_active {
        "badge badge-success"
    } else {
        "badge badge-ghost"
    };
    let toggle_class = if is_active {
        "btn btn-outline btn-warning btn-sm"
    } else {
        "btn btn-outline btn-success btn-sm"
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            {first_image.map(|src| view! {
                <figure>
                    <img src=src alt=name.clone() class="h-40 w-full object-cover" />
                </figure>
            })}
            <div class="card-body">
                <div class="flex items-center justify-between">
                    <h3 class="card-title">{name.clone()}</h3>
                    <span class=badge_class>
                        {if is_active { "在售" } else { "已下架" }}
                    </span>
                </div>
                <p class="text-base-content/70 text-sm">{description}</p>

                {move || if is_editing() {
                    view! {
                        <div class="space-y-2 mt-2">
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"价格"</span>
                                </label>
                                <input
                                    type="number"
                                    step="0.01"
                                    min="0"
                                    class="input input-bordered input-sm w-full"
                                    prop:value=move || {
                                        editing.with(|d| d.as_ref().map(|d| d.price.clone()).unwrap_or_default())
                                    }
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        editing.update(|draft| {
                                            if let Some(draft) = draft {
                                                draft.price = value;
                                            }
                                        });
                                    }
                                />
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"库存"</span>
                                </label>
                                <input
                                    type="number"
                                    min="0"
                                    class="input input-bordered input-sm w-full"
                                    prop:value=move || {
                                        editing.with(|d| d.as_ref().map(|d| d.stock.clone()).unwrap_or_default())
                                    }
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        editing.update(|draft| {
                                            if let Some(draft) = draft {
                                                draft.stock = value;
                                            }
                                        });
                                    }
                                />
                            </div>
                            <div class="flex gap-2">
                                <button
                                    on:click=move |_| on_save.run(())
                                    class="btn btn-success btn-sm"
                                >
                                    "保存"
                                </button>
                                <button
                                    on:click=move |_| editing.set(None)
                                    class="btn btn-ghost btn-sm"
                                >
                                    "取消"
                                </button>
                            </div>
                        </div>
                    }.into_any()
                } else {
                    view! {
                        <div class="mt-2">
                            <p class="text-lg font-bold">{format!("${:.2}", display_price)}</p>
                            <Show when=move || has_discount>
                                <p class="text-sm text-base-content/50 line-through">
                                    {format!("${:.2}", price)}
                                </p>
                            </Show>
                            <p class="text-sm text-base-content/60">{format!("库存: {stock}")}</p>
                            <button
                                on:click=move |_| {
                                    editing.set(Some(EditDraft::from_product(product_id, price, stock)));
                                }
                                class="btn btn-outline btn-info btn-sm mt-2"
                            >
                                "编辑价格/库存"
                            </button>
                        </div>
                    }.into_any()
                }}

                <div class="card-actions mt-4">
                    <button
                        on:click=move |_| on_toggle.run(product_id)
                        class=toggle_class
                    >
                        {if is_active { "下架" } else { "上架" }}
                    </button>
                    <button
                        on:click=move |_| on_delete.run(product_id)
                        class="btn btn-outline btn-error btn-sm gap-2"
                    >
                        <Trash2 attr:class="h-4 w-4" />
                        "删除"
                    </button>
                </div>
            </div>
        </div>
    }
}
